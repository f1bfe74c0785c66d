#![allow(dead_code)]

use bitsearch::board::legal_moves;
use bitsearch::Position;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
pub const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

/// Positions reached by seeded random playouts from the start position and
/// Kiwipete, stopping a game early at mate or stalemate.
pub fn random_positions(seed: u64, games: usize, plies: usize) -> Vec<Position> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut out = Vec::new();
    for g in 0..games {
        let mut pos = if g % 2 == 0 { Position::startpos() } else { Position::from_fen(KIWIPETE).unwrap() };
        for _ in 0..plies {
            let side = pos.side_to_move();
            let moves = legal_moves(&mut pos, side);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            pos.make(mv, side);
            out.push(pos);
        }
    }
    out
}
