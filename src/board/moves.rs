use std::fmt;

use super::types::{parse_square, square_name, PieceKind, Square};

/// Fixed per-ply move buffer capacity.
pub const MAX_MOVES: usize = 256;

/// A move as a plain value. `score` is scratch space for move ordering and is
/// ignored by equality.
///
/// Equality compares the promotion as well as piece, from and to, so the four
/// promotions of one pawn push are distinct moves (killer, counter-move and
/// PV lookups never confuse an under-promotion with the queen push).
#[derive(Clone, Copy, Debug, Default)]
pub struct Move {
    pub piece: PieceKind,
    pub from: Square,
    pub to: Square,
    pub score: i32,
    pub promotion: Option<PieceKind>,
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.piece == other.piece
            && self.from == other.from
            && self.to == other.to
            && self.promotion == other.promotion
    }
}

impl Eq for Move {}

impl Move {
    #[inline]
    pub const fn new(piece: PieceKind, from: Square, to: Square) -> Self {
        Move { piece, from, to, score: 0, promotion: None }
    }

    #[inline]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Move { piece: PieceKind::Pawn, from, to, score: 0, promotion: Some(promotion) }
    }

    /// External form: `from * 64 + to`.
    #[inline]
    pub const fn encode(&self) -> u16 {
        self.from as u16 * 64 + self.to as u16
    }

    /// 16-bit form stored in the transposition table and the opening book:
    /// `from | to << 6 | promo << 12`, promo 0 meaning none.
    #[inline]
    pub fn pack(&self) -> u16 {
        let promo = self.promotion.map_or(0, |p| p.index() as u16);
        self.from as u16 | (self.to as u16) << 6 | promo << 12
    }

    #[inline]
    pub fn matches_packed(&self, packed: u16) -> bool {
        packed != 0 && self.pack() == packed
    }

    /// Long algebraic text, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        let mut s = square_name(self.from);
        s.push_str(&square_name(self.to));
        if let Some(p) = self.promotion {
            s.push(p.to_char());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// Parses UCI text into `(from, to, promotion)`; the piece is resolved
/// against a position by the caller.
pub fn parse_uci(s: &str) -> Option<(Square, Square, Option<PieceKind>)> {
    if !(4..=5).contains(&s.len()) || !s.is_ascii() {
        return None;
    }
    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;
    let promo = match s[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_char(c)? {
            p @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen) => Some(p),
            _ => return None,
        },
    };
    Some((from, to, promo))
}

/// Fixed-capacity move buffer. Overflow is a generator bug: debug builds
/// assert, release builds drop the excess move.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList { moves: [Move::default(); MAX_MOVES], len: 0 }
    }
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES, "move list overflow");
        if self.len < MAX_MOVES {
            self.moves[self.len] = mv;
            self.len += 1;
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.as_slice().contains(mv)
    }

    /// Moves the highest-scored move in `start..` to `start` and returns it.
    #[inline]
    pub fn pick_next(&mut self, start: usize) -> Move {
        let mut best = start;
        for i in start + 1..self.len {
            if self.moves[i].score > self.moves[best].score {
                best = i;
            }
        }
        self.moves.swap(start, best);
        self.moves[start]
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, i: usize) -> &Move {
        &self.as_slice()[i]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
