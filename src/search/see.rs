use crate::board::types::{bit, Bitboard, Color, PieceKind, Square};
use crate::board::{Move, Position};

/// Exchange value of a piece in centipawns.
#[inline]
pub fn see_value(kind: PieceKind) -> i32 {
    kind.value()
}

// Longest possible exchange: every other piece on the board recaptures once.
const MAX_SWAPS: usize = 32;

/// Opening state of an exchange: material won by the first capture, value of
/// the piece left standing on the square, and occupancy after the move.
fn first_capture(pos: &Position, mv: &Move, side: Color) -> (i32, i32, Bitboard) {
    let mut occ = pos.occupied() ^ bit(mv.from);
    let mut gain = match pos.captured_kind(mv, side) {
        Some(victim) => see_value(victim),
        None => 0,
    };
    if pos.is_en_passant(mv) {
        let behind = if side == Color::White { mv.to - 8 } else { mv.to + 8 };
        occ ^= bit(behind);
    }
    let mut on_square = see_value(mv.piece);
    if let Some(promo) = mv.promotion {
        gain += see_value(promo) - see_value(PieceKind::Pawn);
        on_square = see_value(promo);
    }
    (gain, on_square, occ | bit(mv.to))
}

/// Least valuable piece of `side` attacking `to`, if it may legally take.
/// A king only takes when nothing of the other side covers the square once
/// the king has left its origin.
fn next_attacker(pos: &Position, to: Square, occ: Bitboard, side: Color) -> Option<(PieceKind, Square)> {
    let attackers = pos.attackers_to(to, occ) & occ & pos.color_bb(side);
    if attackers == 0 {
        return None;
    }
    let kind = PieceKind::ALL.into_iter().find(|&k| attackers & pos.pieces(side, k) != 0)?;
    let sq = (attackers & pos.pieces(side, kind)).trailing_zeros() as Square;
    if kind == PieceKind::King {
        let after = occ ^ bit(sq);
        if pos.attackers_to(to, after) & after & pos.color_bb(!side) != 0 {
            return None;
        }
    }
    Some((kind, sq))
}

/// Net material for `side` after the best-play exchange on `mv.to`,
/// least valuable attacker first. Positive is good for the mover.
pub fn see(pos: &Position, mv: &Move, side: Color) -> i32 {
    let (first, mut on_square, mut occ) = first_capture(pos, mv, side);
    let mut gain = [0i32; MAX_SWAPS];
    gain[0] = first;
    let mut depth = 0;
    let mut stm = !side;

    while depth + 1 < MAX_SWAPS {
        let Some((kind, sq)) = next_attacker(pos, mv.to, occ, stm) else {
            break;
        };
        depth += 1;
        gain[depth] = on_square - gain[depth - 1];
        // Removing the attacker exposes whatever slides behind it.
        occ ^= bit(sq);
        on_square = see_value(kind);
        stm = !stm;
    }

    while depth > 0 {
        gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
        depth -= 1;
    }
    gain[0]
}

/// Whether `see(pos, mv, side) >= threshold`, decided on a running balance
/// that stops as soon as the outcome can no longer flip.
pub fn see_ge(pos: &Position, mv: &Move, side: Color, threshold: i32) -> bool {
    let (first, mut on_square, mut occ) = first_capture(pos, mv, side);

    // Balance relative to the threshold if the exchange stopped now.
    let mut balance = first - threshold;
    if balance < 0 {
        return false;
    }
    if balance - on_square >= 0 {
        return true;
    }

    let mut stm = !side;
    loop {
        // `stm` is losing if it stops here, so it must capture.
        let Some((kind, sq)) = next_attacker(pos, mv.to, occ, stm) else {
            return stm != side;
        };
        let mover_is_us = stm == side;
        balance += if mover_is_us { on_square } else { -on_square };
        let winning = |b: i32| if mover_is_us { b >= 0 } else { b < 0 };
        if !winning(balance) {
            return !mover_is_us;
        }
        let recaptured = if mover_is_us { balance - see_value(kind) } else { balance + see_value(kind) };
        if winning(recaptured) {
            return mover_is_us;
        }
        occ ^= bit(sq);
        on_square = see_value(kind);
        stm = !stm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::movegen::find_uci_move;

    fn see_of(fen: &str, uci: &str) -> i32 {
        let mut pos = Position::from_fen(fen).unwrap();
        let mv = find_uci_move(&mut pos, uci).unwrap();
        see(&pos, &mv, pos.side_to_move())
    }

    #[test]
    fn see_detects_bad_exchange_rook_x_pawn_on_h7() {
        // Rxh7 Kxh7 wins the rook.
        let v = see_of("6k1/2R4p/6p1/8/6K1/6P1/8/8 w - - 3 38", "c7h7");
        assert_eq!(v, 100 - 500);
    }

    #[test]
    fn king_cannot_recapture_defended_square() {
        // Rxh7 is covered by the bishop on d3 through the open diagonal.
        let v = see_of("6k1/2R4p/8/8/8/3B2K1/8/8 w - - 0 1", "c7h7");
        assert_eq!(v, 100);
    }

    #[test]
    fn xray_rook_behind_rook_joins_exchange() {
        // Knight on d5 defended once by the e6 pawn; white rooks doubled on the d-file.
        let fen = "4k3/8/4p3/3n4/8/8/3R4/3RK3 w - - 0 1";
        let v = see_of(fen, "d2d5");
        // RxN, pxR, RxP: 320 - 500 + 100.
        assert_eq!(v, -80);
        let mut pos = Position::from_fen(fen).unwrap();
        let mv = find_uci_move(&mut pos, "d2d5").unwrap();
        assert!(see_ge(&pos, &mv, Color::White, -80));
        assert!(!see_ge(&pos, &mv, Color::White, -79));
    }

    #[test]
    fn quiet_move_onto_attacked_square_loses_the_piece() {
        let v = see_of("4k3/8/8/3p4/8/8/8/2N1K3 w - - 0 1", "c1b3");
        assert_eq!(v, 0);
        let v = see_of("4k3/8/2p5/8/8/8/8/2N1K3 w - - 0 1", "c1d3");
        assert_eq!(v, 0);
        let v = see_of("4k3/8/8/8/4p3/8/8/2N1K3 w - - 0 1", "c1d3");
        assert_eq!(v, -320);
    }
}
