use crate::board::types::{Color, PieceKind};
use crate::board::{Move, MoveList, Position};

use super::see::{see_ge, see_value};
use super::tt::MAX_PLY;

// Ordering bands, highest first.
pub const TT_MOVE: i32 = 1 << 30;
pub const GOOD_CAPTURE: i32 = 1 << 26;
pub const KILLER_1: i32 = 1 << 25;
pub const KILLER_2: i32 = KILLER_1 - 1;
pub const COUNTER_MOVE: i32 = 1 << 24;
pub const HISTORY_MAX: i32 = 1 << 20;
pub const BAD_CAPTURE: i32 = -(1 << 26);

/// Most valuable victim first, least valuable attacker as tiebreak.
#[inline]
pub fn mvv_lva(victim: PieceKind, attacker: PieceKind) -> i32 {
    (see_value(victim) << 4) - see_value(attacker)
}

/// Killer, history and counter-move tables for one search.
pub struct Heuristics {
    killers: [[Option<Move>; 2]; MAX_PLY],
    history: [[[i32; 64]; 6]; 2],
    counters: Vec<Option<Move>>,
    pub use_killers: bool,
    pub use_history: bool,
    pub use_counters: bool,
}

impl Default for Heuristics {
    fn default() -> Self {
        Heuristics {
            killers: [[None; 2]; MAX_PLY],
            history: [[[0; 64]; 6]; 2],
            counters: vec![None; 2 * 64 * 64],
            use_killers: true,
            use_history: true,
            use_counters: true,
        }
    }
}

#[inline]
fn counter_index(side: Color, prev: &Move) -> usize {
    side.index() * 4096 + prev.from as usize * 64 + prev.to as usize
}

impl Heuristics {
    pub fn clear(&mut self) {
        self.killers = [[None; 2]; MAX_PLY];
        self.history = [[[0; 64]; 6]; 2];
        self.counters.fill(None);
    }

    pub fn killers(&self, ply: usize) -> [Option<Move>; 2] {
        self.killers.get(ply).copied().unwrap_or([None; 2])
    }

    pub fn store_killer(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.killers.get_mut(ply) else {
            return;
        };
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    #[inline]
    pub fn history(&self, side: Color, mv: &Move) -> i32 {
        self.history[side.index()][mv.piece.index()][mv.to as usize]
    }

    /// Rewards a quiet cutoff move; the whole table halves on saturation.
    pub fn reward(&mut self, side: Color, mv: &Move, depth: i32) {
        let entry = &mut self.history[side.index()][mv.piece.index()][mv.to as usize];
        *entry += depth * depth;
        if *entry >= HISTORY_MAX {
            for v in self.history.iter_mut().flatten().flatten() {
                *v /= 2;
            }
        }
    }

    pub fn counter(&self, side: Color, prev: Option<Move>) -> Option<Move> {
        prev.and_then(|p| self.counters[counter_index(side, &p)])
    }

    pub fn set_counter(&mut self, side: Color, prev: Option<Move>, mv: Move) {
        if let Some(p) = prev {
            self.counters[counter_index(side, &p)] = Some(mv);
        }
    }

    /// Assigns ordering scores: TT move, winning and equal captures, killers,
    /// counter-move, quiets by history, then losing captures.
    pub fn score_moves(
        &self,
        pos: &Position,
        side: Color,
        list: &mut MoveList,
        tt_move: Option<u16>,
        ply: usize,
        prev: Option<Move>,
    ) {
        let killers = if self.use_killers { self.killers(ply) } else { [None; 2] };
        let counter = if self.use_counters { self.counter(side, prev) } else { None };
        for mv in list.as_mut_slice() {
            mv.score = if tt_move.is_some_and(|p| mv.matches_packed(p)) {
                TT_MOVE
            } else if let Some(victim) = pos.captured_kind(mv, side) {
                let mvv = mvv_lva(victim, mv.piece) + mv.promotion.map_or(0, see_value);
                if see_ge(pos, mv, side, 0) { GOOD_CAPTURE + mvv } else { BAD_CAPTURE + mvv }
            } else if let Some(promo) = mv.promotion {
                // Quiet promotions sit with the good captures, queen first.
                GOOD_CAPTURE + see_value(promo)
            } else if killers[0] == Some(*mv) {
                KILLER_1
            } else if killers[1] == Some(*mv) {
                KILLER_2
            } else if counter == Some(*mv) {
                COUNTER_MOVE
            } else if self.use_history {
                self.history(side, mv)
            } else {
                0
            };
        }
    }
}

/// Captures ordered by victim and attacker only, for quiescence.
pub fn score_captures(pos: &Position, side: Color, list: &mut MoveList) {
    for mv in list.as_mut_slice() {
        let victim = pos.captured_kind(mv, side).map_or(0, see_value);
        let promo = mv.promotion.map_or(0, |p| see_value(p) - see_value(PieceKind::Pawn));
        mv.score = (victim << 4) - see_value(mv.piece) + (promo << 4);
    }
}
