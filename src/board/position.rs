use super::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::moves::Move;
use super::types::*;
use crate::error::{EngineError, Result};

/// Bitboard position: six masks per side plus side-to-move, castling rights,
/// castle-completed flags and the en-passant target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pieces: [[Bitboard; 6]; 2],
    occupancy: [Bitboard; 2],
    side_to_move: Color,
    castling: u8,
    castled: u8,
    en_passant: Option<Square>,
}

/// Everything `unmake` needs to invert one `make`.
#[derive(Clone, Copy, Debug)]
pub struct Undo {
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceKind>,
    pub captured_square: Square,
    pub castling: u8,
    pub castled: u8,
    pub en_passant: Option<Square>,
    pub side_to_move: Color,
}

/// State saved by a null move.
#[derive(Clone, Copy, Debug)]
pub struct NullUndo {
    en_passant: Option<Square>,
    side_to_move: Color,
}

/// Full copy of a position, for plies where saving everything is cheaper
/// than inverting a move.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot(Position);

const HASH_KEYS: [u64; 13] = [
    0x9E37_79B9_7F4A_7C15, 0xC2B2_AE3D_27D4_EB4F, 0x1656_67B1_9E37_79F9, 0xD6E8_FEB8_6659_FD93,
    0xA076_1D64_78BD_642F, 0xE703_7ED1_A0B4_28DB, 0x8EBC_6AF0_9C88_C6E3, 0x5899_65CC_7537_4CC3,
    0x1D8E_4E27_C47D_124F, 0xBF58_476D_1CE4_E5B9, 0x94D0_49BB_1331_11EB, 0x2545_F491_4F6C_DD1D,
    0x7FB5_D329_728E_A185,
];

#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// Corner rook squares and the rights they carry.
const ROOK_CORNERS: [(Square, u8); 4] = [
    (H1, WHITE_KINGSIDE),
    (A1, WHITE_QUEENSIDE),
    (H8, BLACK_KINGSIDE),
    (A8, BLACK_QUEENSIDE),
];

/// Rook origin and destination for a castling king move.
#[inline]
pub(crate) fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to {
        G1 => (H1, F1),
        C1 => (A1, D1),
        G8 => (H8, F8),
        _ => (A8, D8),
    }
}

#[inline]
fn castle_flag(king_to: Square) -> u8 {
    match king_to {
        G1 => WHITE_KINGSIDE,
        C1 => WHITE_QUEENSIDE,
        G8 => BLACK_KINGSIDE,
        _ => BLACK_QUEENSIDE,
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        let white = [
            0x0000_0000_0000_FF00,
            bit(B1) | bit(G1),
            bit(C1) | bit(F1),
            bit(A1) | bit(H1),
            bit(D1),
            bit(E1),
        ];
        let mut black = [0; 6];
        for (b, w) in black.iter_mut().zip(white) {
            *b = w.swap_bytes();
        }
        let mut pos = Position {
            pieces: [white, black],
            occupancy: [0; 2],
            side_to_move: Color::White,
            castling: ALL_CASTLING,
            castled: 0,
            en_passant: None,
        };
        pos.update_occupancy();
        pos
    }

    /// Builds a position from twelve masks (pawn..king per side), white to move.
    pub fn from_bitboards(white: [Bitboard; 6], black: [Bitboard; 6], castling: u8, castled: u8) -> Result<Self> {
        let mut pos = Position {
            pieces: [white, black],
            occupancy: [0; 2],
            side_to_move: Color::White,
            castling: castling & ALL_CASTLING,
            castled: castled & ALL_CASTLING,
            en_passant: None,
        };
        pos.update_occupancy();
        let check = pos.validate();
        debug_assert!(check.is_ok(), "{:?}", check);
        check.map(|_| pos)
    }

    /// Checks the structural invariants: disjoint masks, one king per side and
    /// no check against the side not on move.
    pub fn validate(&self) -> Result<()> {
        for color in Color::ALL {
            let mut seen = 0;
            for kind in PieceKind::ALL {
                let bb = self.pieces[color.index()][kind.index()];
                if seen & bb != 0 {
                    return Err(EngineError::InvalidPosition(format!("{color:?} {kind:?} overlaps another piece")));
                }
                seen |= bb;
            }
            let kings = self.pieces(color, PieceKind::King).count_ones();
            if kings != 1 {
                return Err(EngineError::InvalidPosition(format!("{color:?} has {kings} kings")));
            }
        }
        if self.occupancy[0] & self.occupancy[1] != 0 {
            return Err(EngineError::InvalidPosition("white and black share a square".into()));
        }
        if (self.pieces(Color::White, PieceKind::Pawn) | self.pieces(Color::Black, PieceKind::Pawn)) & (RANK_1 | RANK_8) != 0 {
            return Err(EngineError::InvalidPosition("pawn on a back rank".into()));
        }
        // The side that just moved cannot have left its king attacked.
        if self.in_check(!self.side_to_move) {
            return Err(EngineError::InvalidPosition(format!("{:?} to move can capture the king", self.side_to_move)));
        }
        Ok(())
    }

    pub(crate) fn from_parts(pieces: [[Bitboard; 6]; 2], side_to_move: Color, castling: u8, en_passant: Option<Square>) -> Result<Self> {
        let mut pos = Position { pieces, occupancy: [0; 2], side_to_move, castling, castled: 0, en_passant };
        pos.update_occupancy();
        pos.validate()?;
        if let Some(ep) = en_passant {
            let ep_rank = if side_to_move == Color::White { 5 } else { 2 };
            if rank_of(ep) != ep_rank || pawn_attacks(!side_to_move, ep) & pos.pieces(side_to_move, PieceKind::Pawn) == 0 {
                pos.en_passant = None;
            }
        }
        // Drop rights whose king or rook has left its home square.
        for (corner, right) in ROOK_CORNERS {
            let color = if corner < 8 { Color::White } else { Color::Black };
            let king_home = if color == Color::White { E1 } else { E8 };
            if pos.pieces(color, PieceKind::Rook) & bit(corner) == 0 || pos.pieces(color, PieceKind::King) & bit(king_home) == 0 {
                pos.castling &= !right;
            }
        }
        Ok(pos)
    }

    #[inline]
    fn update_occupancy(&mut self) {
        for c in 0..2 {
            self.occupancy[c] = self.pieces[c].iter().fold(0, |acc, bb| acc | bb);
        }
    }

    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn castled(&self) -> u8 {
        self.castled
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color, PieceKind::King).trailing_zeros() as Square
    }

    /// Kind of `color`'s piece on `sq`, if any.
    #[inline]
    pub fn kind_at(&self, color: Color, sq: Square) -> Option<PieceKind> {
        let b = bit(sq);
        if self.occupancy[color.index()] & b == 0 {
            return None;
        }
        PieceKind::ALL.into_iter().find(|&k| self.pieces(color, k) & b != 0)
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, PieceKind)> {
        Color::ALL.into_iter().find_map(|c| self.kind_at(c, sq).map(|k| (c, k)))
    }

    /// True if the side has anything besides pawns and the king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let c = color.index();
        self.pieces[c][PieceKind::Knight.index()]
            | self.pieces[c][PieceKind::Bishop.index()]
            | self.pieces[c][PieceKind::Rook.index()]
            | self.pieces[c][PieceKind::Queen.index()]
            != 0
    }

    /// Whether `mv` by `side` takes something, en passant included.
    #[inline]
    pub fn is_capture(&self, mv: &Move, side: Color) -> bool {
        self.occupancy[(!side).index()] & bit(mv.to) != 0 || self.is_en_passant(mv)
    }

    /// Piece removed by `mv` when played by `side`.
    #[inline]
    pub fn captured_kind(&self, mv: &Move, side: Color) -> Option<PieceKind> {
        self.kind_at(!side, mv.to).or_else(|| self.is_en_passant(mv).then_some(PieceKind::Pawn))
    }

    #[inline]
    pub fn is_en_passant(&self, mv: &Move) -> bool {
        mv.piece == PieceKind::Pawn && Some(mv.to) == self.en_passant && file_of(mv.from) != file_of(mv.to)
    }

    /// Pieces of both colors attacking `sq` given occupancy `occ`.
    pub fn attackers_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let bishops = self.pieces(Color::White, PieceKind::Bishop)
            | self.pieces(Color::Black, PieceKind::Bishop)
            | self.pieces(Color::White, PieceKind::Queen)
            | self.pieces(Color::Black, PieceKind::Queen);
        let rooks = self.pieces(Color::White, PieceKind::Rook)
            | self.pieces(Color::Black, PieceKind::Rook)
            | self.pieces(Color::White, PieceKind::Queen)
            | self.pieces(Color::Black, PieceKind::Queen);
        (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, PieceKind::Pawn))
            | (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, PieceKind::Pawn))
            | (knight_attacks(sq) & (self.pieces(Color::White, PieceKind::Knight) | self.pieces(Color::Black, PieceKind::Knight)))
            | (king_attacks(sq) & (self.pieces(Color::White, PieceKind::King) | self.pieces(Color::Black, PieceKind::King)))
            | (bishop_attacks(sq, occ) & bishops)
            | (rook_attacks(sq, occ) & rooks)
    }

    /// Whether `by` attacks `sq`, projected backwards from the square.
    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let occ = self.occupied();
        let queens = self.pieces(by, PieceKind::Queen);
        pawn_attacks(!by, sq) & self.pieces(by, PieceKind::Pawn) != 0
            || knight_attacks(sq) & self.pieces(by, PieceKind::Knight) != 0
            || king_attacks(sq) & self.pieces(by, PieceKind::King) != 0
            || bishop_attacks(sq, occ) & (self.pieces(by, PieceKind::Bishop) | queens) != 0
            || rook_attacks(sq, occ) & (self.pieces(by, PieceKind::Rook) | queens) != 0
    }

    /// Whether `side`'s king is attacked.
    #[inline]
    pub fn in_check(&self, side: Color) -> bool {
        self.is_attacked(self.king_square(side), !side)
    }

    /// Applies a pseudo-legal move for `side`.
    pub fn make(&mut self, mv: Move, side: Color) -> Undo {
        let us = side.index();
        let them = (!side).index();
        let from_bb = bit(mv.from);
        let to_bb = bit(mv.to);
        let mut undo = Undo {
            piece: mv.piece,
            from: mv.from,
            to: mv.to,
            captured: None,
            captured_square: mv.to,
            castling: self.castling,
            castled: self.castled,
            en_passant: self.en_passant,
            side_to_move: self.side_to_move,
        };

        if let Some(victim) = self.kind_at(!side, mv.to) {
            self.pieces[them][victim.index()] &= !to_bb;
            undo.captured = Some(victim);
            if victim == PieceKind::Rook {
                for (corner, right) in ROOK_CORNERS {
                    if corner == mv.to && right & castle_bits(!side) != 0 {
                        self.castling &= !right;
                    }
                }
            }
        } else if self.is_en_passant(&mv) {
            let cap = if side == Color::White { mv.to - 8 } else { mv.to + 8 };
            self.pieces[them][PieceKind::Pawn.index()] &= !bit(cap);
            undo.captured = Some(PieceKind::Pawn);
            undo.captured_square = cap;
        }

        self.pieces[us][mv.piece.index()] &= !from_bb;
        self.pieces[us][mv.promotion.unwrap_or(mv.piece).index()] |= to_bb;

        match mv.piece {
            PieceKind::King => {
                self.castling &= !castle_bits(side);
                if mv.from.abs_diff(mv.to) == 2 {
                    let (rook_from, rook_to) = castle_rook_squares(mv.to);
                    self.pieces[us][PieceKind::Rook.index()] ^= bit(rook_from) | bit(rook_to);
                    self.castled |= castle_flag(mv.to);
                }
            }
            PieceKind::Rook => {
                for (corner, right) in ROOK_CORNERS {
                    if corner == mv.from && right & castle_bits(side) != 0 {
                        self.castling &= !right;
                    }
                }
            }
            _ => {}
        }

        // Only recorded when an enemy pawn can take, so equal positions hash equally.
        self.en_passant = None;
        if mv.piece == PieceKind::Pawn && mv.from.abs_diff(mv.to) == 16 {
            let ep = (mv.from + mv.to) / 2;
            if pawn_attacks(side, ep) & self.pieces[them][PieceKind::Pawn.index()] != 0 {
                self.en_passant = Some(ep);
            }
        }
        self.side_to_move = !side;
        self.update_occupancy();
        undo
    }

    /// Exact inverse of `make`.
    pub fn unmake(&mut self, mv: Move, side: Color, undo: &Undo) {
        let us = side.index();
        let to_bb = bit(undo.to);
        self.pieces[us][mv.promotion.unwrap_or(undo.piece).index()] &= !to_bb;
        self.pieces[us][undo.piece.index()] |= bit(undo.from);

        if undo.piece == PieceKind::King && undo.from.abs_diff(undo.to) == 2 {
            let (rook_from, rook_to) = castle_rook_squares(undo.to);
            self.pieces[us][PieceKind::Rook.index()] ^= bit(rook_from) | bit(rook_to);
        }
        if let Some(victim) = undo.captured {
            self.pieces[(!side).index()][victim.index()] |= bit(undo.captured_square);
        }

        self.castling = undo.castling;
        self.castled = undo.castled;
        self.en_passant = undo.en_passant;
        self.side_to_move = undo.side_to_move;
        self.update_occupancy();
    }

    /// Passes the turn.
    pub fn make_null(&mut self) -> NullUndo {
        let undo = NullUndo { en_passant: self.en_passant, side_to_move: self.side_to_move };
        self.en_passant = None;
        self.side_to_move = !self.side_to_move;
        undo
    }

    pub fn unmake_null(&mut self, undo: NullUndo) {
        self.en_passant = undo.en_passant;
        self.side_to_move = undo.side_to_move;
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(*self)
    }

    #[inline]
    pub fn restore(&mut self, snap: &Snapshot) {
        *self = snap.0;
    }

    /// Order-independent position key; depends only on the logical state.
    pub fn hash(&self) -> u64 {
        let mut h = 0;
        for c in 0..2 {
            for k in 0..6 {
                h ^= mix(self.pieces[c][k] ^ HASH_KEYS[c * 6 + k]);
            }
        }
        let ep = self.en_passant.map_or(0, |sq| sq as u64 + 1);
        let flags = self.side_to_move.index() as u64
            | (self.castling as u64) << 1
            | (self.castled as u64) << 5
            | ep << 9;
        h ^ mix(flags.wrapping_add(HASH_KEYS[12]))
    }

    /// ASCII diagram, white at the bottom.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            out.push((b'1' + rank) as char);
            out.push(' ');
            for file in 0..8u8 {
                let c = match self.piece_at(rank * 8 + file) {
                    Some((Color::White, k)) => k.to_char().to_ascii_uppercase(),
                    Some((Color::Black, k)) => k.to_char(),
                    None => '.',
                };
                out.push(c);
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");
        out
    }
}
