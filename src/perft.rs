use crate::board::movegen::{generate, GenMode};
use crate::board::{Move, MoveList, Position};

/// Leaf count of the legal move tree, walked with make/unmake.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let side = pos.side_to_move();
    let mut moves = MoveList::new();
    generate(pos, side, GenMode::Legal, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for &mv in moves.iter() {
        let undo = pos.make(mv, side);
        nodes += perft(pos, depth - 1);
        pos.unmake(mv, side, &undo);
    }
    nodes
}

/// Per-root-move leaf counts, in generation order.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    let side = pos.side_to_move();
    let mut moves = MoveList::new();
    generate(pos, side, GenMode::Legal, &mut moves);
    moves
        .iter()
        .map(|&mv| {
            let undo = pos.make(mv, side);
            let n = perft(pos, depth.saturating_sub(1));
            pos.unmake(mv, side, &undo);
            (mv, n)
        })
        .collect()
}
