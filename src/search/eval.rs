use crate::board::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
use crate::board::types::*;
use crate::board::Position;

use super::tt::MATE_BOUND;

// Middlegame and endgame material in centipawns.
const MG_VALUE: [i32; 6] = [100, 320, 330, 500, 900, 0];
const EG_VALUE: [i32; 6] = [120, 310, 340, 500, 900, 0];

const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];
const TOTAL_PHASE: i32 = 24;

const TEMPO: i32 = 10;
const CASTLED_BONUS: i32 = 25;
const MOBILITY_WEIGHT: [i32; 6] = [0, 4, 3, 2, 1, 0];
const PASSED_PAWN_EG: [i32; 8] = [0, 10, 15, 25, 45, 70, 110, 0];

// Piece-square tables from White's point of view, rank 8 first.
#[rustfmt::skip]
const PST: [[i32; 64]; 6] = [
    [
         0,  0,  0,  0,  0,  0,  0,  0,
        50, 50, 50, 50, 50, 50, 50, 50,
        10, 10, 20, 30, 30, 20, 10, 10,
         5,  5, 10, 25, 25, 10,  5,  5,
         0,  0,  0, 20, 20,  0,  0,  0,
         5, -5,-10,  0,  0,-10, -5,  5,
         5, 10, 10,-20,-20, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ],
    [
        -50,-40,-30,-30,-30,-30,-40,-50,
        -40,-20,  0,  0,  0,  0,-20,-40,
        -30,  0, 10, 15, 15, 10,  0,-30,
        -30,  5, 15, 20, 20, 15,  5,-30,
        -30,  0, 15, 20, 20, 15,  0,-30,
        -30,  5, 10, 15, 15, 10,  5,-30,
        -40,-20,  0,  5,  5,  0,-20,-40,
        -50,-40,-30,-30,-30,-30,-40,-50,
    ],
    [
        -20,-10,-10,-10,-10,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5, 10, 10,  5,  0,-10,
        -10,  5,  5, 10, 10,  5,  5,-10,
        -10,  0, 10, 10, 10, 10,  0,-10,
        -10, 10, 10, 10, 10, 10, 10,-10,
        -10,  5,  0,  0,  0,  0,  5,-10,
        -20,-10,-10,-10,-10,-10,-10,-20,
    ],
    [
          0,  0,  0,  0,  0,  0,  0,  0,
          5, 10, 10, 10, 10, 10, 10,  5,
         -5,  0,  0,  0,  0,  0,  0, -5,
         -5,  0,  0,  0,  0,  0,  0, -5,
         -5,  0,  0,  0,  0,  0,  0, -5,
         -5,  0,  0,  0,  0,  0,  0, -5,
         -5,  0,  0,  0,  0,  0,  0, -5,
          0,  0,  0,  5,  5,  0,  0,  0,
    ],
    [
        -20,-10,-10, -5, -5,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5,  5,  5,  5,  0,-10,
         -5,  0,  5,  5,  5,  5,  0, -5,
          0,  0,  5,  5,  5,  5,  0, -5,
        -10,  5,  5,  5,  5,  5,  0,-10,
        -10,  0,  5,  0,  0,  0,  0,-10,
        -20,-10,-10, -5, -5,-10,-10,-20,
    ],
    [
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -20,-30,-30,-40,-40,-30,-30,-20,
        -10,-20,-20,-20,-20,-20,-20,-10,
         20, 20,  0,  0,  0,  0, 20, 20,
         20, 30, 10,  0,  0, 10, 30, 20,
    ],
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

const CENTER: Bitboard = 0x0000_0018_1800_0000;

#[inline]
fn pst_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => (sq ^ 56) as usize,
        Color::Black => sq as usize,
    }
}

/// Game phase in `0..=24`, 24 being the full opening material.
pub fn phase(pos: &Position) -> i32 {
    let mut p = 0;
    for color in Color::ALL {
        for kind in PieceKind::ALL {
            p += PHASE_WEIGHT[kind.index()] * pos.pieces(color, kind).count_ones() as i32;
        }
    }
    p.min(TOTAL_PHASE)
}

fn attacks_of(pos: &Position, color: Color, kind: PieceKind, sq: Square) -> Bitboard {
    let occ = pos.occupied();
    match kind {
        PieceKind::Pawn => pawn_attacks(color, sq),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occ),
        PieceKind::Rook => rook_attacks(sq, occ),
        PieceKind::Queen => queen_attacks(sq, occ),
        PieceKind::King => king_attacks(sq),
    }
}

fn is_passed(pos: &Position, color: Color, sq: Square) -> bool {
    let file = file_of(sq);
    let mut span: Bitboard = FILE_A << file;
    if file > 0 {
        span |= FILE_A << (file - 1);
    }
    if file < 7 {
        span |= FILE_A << (file + 1);
    }
    let rank = rank_of(sq);
    let ahead = match color {
        Color::White if rank < 7 => !0u64 << ((rank + 1) * 8),
        Color::Black if rank > 0 => !0u64 >> ((8 - rank) * 8),
        _ => 0,
    };
    span & ahead & pos.pieces(!color, PieceKind::Pawn) == 0
}

// (midgame, endgame, attacked squares) for one side.
fn side_terms(pos: &Position, color: Color) -> (i32, i32, Bitboard) {
    let mut mg = 0;
    let mut eg = 0;
    let mut attacked = 0;
    let own = pos.color_bb(color);
    for kind in PieceKind::ALL {
        for sq in Squares(pos.pieces(color, kind)) {
            let idx = pst_index(color, sq);
            mg += MG_VALUE[kind.index()] + PST[kind.index()][idx];
            eg += EG_VALUE[kind.index()]
                + if kind == PieceKind::King { KING_EG[idx] } else { PST[kind.index()][idx] };

            let att = attacks_of(pos, color, kind, sq);
            attacked |= att;
            let mobility = MOBILITY_WEIGHT[kind.index()] * (att & !own).count_ones() as i32;
            mg += mobility;
            eg += mobility;

            if kind == PieceKind::Pawn && is_passed(pos, color, sq) {
                let advance = if color == Color::White { rank_of(sq) } else { 7 - rank_of(sq) };
                eg += PASSED_PAWN_EG[advance as usize];
                mg += PASSED_PAWN_EG[advance as usize] / 4;
            }
        }
    }
    if pos.castled() & castle_bits(color) != 0 {
        mg += CASTLED_BONUS;
    }
    mg += 2 * (own & CENTER).count_ones() as i32;
    (mg, eg, attacked)
}

/// Static evaluation in centipawns, positive when White is better.
/// Always strictly inside the mate-score band.
pub fn evaluate(pos: &Position) -> i32 {
    let (mut mg_w, eg_w, att_w) = side_terms(pos, Color::White);
    let (mut mg_b, eg_b, att_b) = side_terms(pos, Color::Black);

    // King safety: squares around each king covered by the opponent.
    mg_w -= 6 * (king_attacks(pos.king_square(Color::White)) & att_b).count_ones() as i32;
    mg_b -= 6 * (king_attacks(pos.king_square(Color::Black)) & att_w).count_ones() as i32;

    let p = phase(pos);
    let mg = mg_w - mg_b;
    let eg = eg_w - eg_b;
    let mut score = (mg * p + eg * (TOTAL_PHASE - p)) / TOTAL_PHASE;
    score += if pos.side_to_move() == Color::White { TEMPO } else { -TEMPO };
    score.clamp(-MATE_BOUND + 1, MATE_BOUND - 1)
}
