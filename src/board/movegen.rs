use super::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
use super::moves::{parse_uci, Move, MoveList};
use super::position::Position;
use super::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenMode {
    /// Every move obeying piece movement rules; may leave the king in check.
    Pseudo,
    /// Pseudo-legal moves that do not leave the mover in check.
    Legal,
}

/// Destination for generated moves: the fixed per-ply buffer or a growable `Vec`.
pub trait MoveSink {
    fn push_move(&mut self, mv: Move);
}

impl MoveSink for MoveList {
    #[inline]
    fn push_move(&mut self, mv: Move) {
        self.push(mv);
    }
}

impl MoveSink for Vec<Move> {
    #[inline]
    fn push_move(&mut self, mv: Move) {
        self.push(mv);
    }
}

/// Castling destinations available to `side`. Shared by generation and
/// `execute`: king and rook on their home squares, right still held, the
/// squares between them empty, and no attacked square under the king's path.
pub fn castle_targets(pos: &Position, side: Color) -> Bitboard {
    let (king_home, kingside, queenside) = match side {
        Color::White => (E1, WHITE_KINGSIDE, WHITE_QUEENSIDE),
        Color::Black => (E8, BLACK_KINGSIDE, BLACK_QUEENSIDE),
    };
    let rights = pos.castling();
    if rights & (kingside | queenside) == 0 || pos.pieces(side, PieceKind::King) & bit(king_home) == 0 {
        return 0;
    }
    let occ = pos.occupied();
    let rooks = pos.pieces(side, PieceKind::Rook);
    let them = !side;
    let safe = |squares: [Square; 3]| squares.iter().all(|&sq| !pos.is_attacked(sq, them));

    let mut targets = 0;
    if rights & kingside != 0
        && rooks & bit(king_home + 3) != 0
        && occ & (bit(king_home + 1) | bit(king_home + 2)) == 0
        && safe([king_home, king_home + 1, king_home + 2])
    {
        targets |= bit(king_home + 2);
    }
    if rights & queenside != 0
        && rooks & bit(king_home - 4) != 0
        && occ & (bit(king_home - 1) | bit(king_home - 2) | bit(king_home - 3)) == 0
        && safe([king_home, king_home - 1, king_home - 2])
    {
        targets |= bit(king_home - 2);
    }
    targets
}

fn pawn_targets(pos: &Position, side: Color, from: Square) -> Bitboard {
    let occ = pos.occupied();
    let mut targets = pawn_attacks(side, from) & pos.color_bb(!side);
    if side == pos.side_to_move() {
        if let Some(ep) = pos.en_passant() {
            targets |= pawn_attacks(side, from) & bit(ep);
        }
    }
    let (push, start_rank) = match side {
        Color::White => (from + 8, 1),
        Color::Black => (from - 8, 6),
    };
    if occ & bit(push) == 0 {
        targets |= bit(push);
        let double = if side == Color::White { push + 8 } else { push.wrapping_sub(8) };
        if rank_of(from) == start_rank && occ & bit(double) == 0 {
            targets |= bit(double);
        }
    }
    targets
}

#[inline]
fn targets_for(pos: &Position, side: Color, kind: PieceKind, from: Square) -> Bitboard {
    let own = pos.color_bb(side);
    let occ = pos.occupied();
    match kind {
        PieceKind::Pawn => pawn_targets(pos, side, from),
        PieceKind::Knight => knight_attacks(from) & !own,
        PieceKind::Bishop => bishop_attacks(from, occ) & !own,
        PieceKind::Rook => rook_attacks(from, occ) & !own,
        PieceKind::Queen => queen_attacks(from, occ) & !own,
        PieceKind::King => king_attacks(from) & !own,
    }
}

/// Pseudo-legal destinations of `side`'s piece on `from`, castling included.
pub fn piece_targets(pos: &Position, side: Color, from: Square) -> Bitboard {
    match pos.kind_at(side, from) {
        None => 0,
        Some(PieceKind::King) => targets_for(pos, side, PieceKind::King, from) | castle_targets(pos, side),
        Some(kind) => targets_for(pos, side, kind, from),
    }
}

#[inline]
fn push_targets<S: MoveSink>(sink: &mut S, side: Color, kind: PieceKind, from: Square, targets: Bitboard) {
    for to in Squares(targets) {
        if kind == PieceKind::Pawn && rank_of(to) == side.promotion_rank() {
            for promo in PieceKind::PROMOTIONS {
                sink.push_move(Move::with_promotion(from, to, promo));
            }
        } else {
            sink.push_move(Move::new(kind, from, to));
        }
    }
}

fn generate_pseudo<S: MoveSink>(pos: &Position, side: Color, sink: &mut S) {
    for kind in PieceKind::ALL {
        for from in Squares(pos.pieces(side, kind)) {
            push_targets(sink, side, kind, from, targets_for(pos, side, kind, from));
        }
    }
    // Castles go last.
    let king = pos.king_square(side);
    for to in Squares(castle_targets(pos, side)) {
        sink.push_move(Move::new(PieceKind::King, king, to));
    }
}

#[inline]
fn is_legal(pos: &mut Position, side: Color, mv: Move) -> bool {
    let snap = pos.snapshot();
    pos.make(mv, side);
    let legal = !pos.in_check(side);
    pos.restore(&snap);
    legal
}

/// Fills `list` with `side`'s moves. Castles are appended after piece moves.
pub fn generate(pos: &mut Position, side: Color, mode: GenMode, list: &mut MoveList) {
    list.clear();
    generate_pseudo(pos, side, list);
    if mode == GenMode::Legal {
        let mut kept = 0;
        for i in 0..list.len() {
            let mv = list[i];
            if is_legal(pos, side, mv) {
                list.as_mut_slice()[kept] = mv;
                kept += 1;
            }
        }
        list.truncate(kept);
    }
}

/// Pseudo-legal captures (en passant included) and every promotion.
pub fn generate_captures(pos: &Position, side: Color, list: &mut MoveList) {
    list.clear();
    let them = pos.color_bb(!side);
    let ep = match pos.en_passant() {
        Some(sq) if side == pos.side_to_move() => bit(sq),
        _ => 0,
    };
    let last_rank = if side == Color::White { RANK_8 } else { RANK_1 };
    for kind in PieceKind::ALL {
        let wanted = if kind == PieceKind::Pawn { them | ep | last_rank } else { them };
        for from in Squares(pos.pieces(side, kind)) {
            push_targets(list, side, kind, from, targets_for(pos, side, kind, from) & wanted);
        }
    }
}

/// Legal moves in a growable buffer, for callers off the search path.
pub fn legal_moves(pos: &mut Position, side: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    generate_pseudo(pos, side, &mut moves);
    moves.retain(|&mv| is_legal(pos, side, mv));
    moves
}

/// Resolves UCI text against the legal moves of the side to move.
pub fn find_uci_move(pos: &mut Position, text: &str) -> Option<Move> {
    let (from, to, promotion) = parse_uci(text)?;
    let side = pos.side_to_move();
    legal_moves(pos, side).into_iter().find(|m| m.from == from && m.to == to && m.promotion == promotion)
}

/// Plays `from -> to` for the side to move after checking ownership,
/// reachability and that the mover's king ends up safe. A pawn reaching the
/// last rank promotes to `promotion`, or a queen when none is given. On
/// failure the position is untouched.
pub fn execute(pos: &mut Position, from: Square, to: Square, promotion: Option<PieceKind>) -> bool {
    if from > 63 || to > 63 {
        return false;
    }
    let side = pos.side_to_move();
    let Some(kind) = pos.kind_at(side, from) else {
        return false;
    };
    if piece_targets(pos, side, from) & bit(to) == 0 {
        return false;
    }
    let promotion = if kind == PieceKind::Pawn && rank_of(to) == side.promotion_rank() {
        match promotion.unwrap_or(PieceKind::Queen) {
            PieceKind::Pawn | PieceKind::King => return false,
            p => Some(p),
        }
    } else {
        None
    };
    let mv = Move { piece: kind, from, to, score: 0, promotion };
    let undo = pos.make(mv, side);
    if pos.in_check(side) {
        pos.unmake(mv, side, &undo);
        return false;
    }
    true
}
