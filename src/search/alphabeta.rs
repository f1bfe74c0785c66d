use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::board::attacks;
use crate::board::movegen::{generate, generate_captures, GenMode};
use crate::board::types::Color;
use crate::board::{Move, MoveList, Position};
use crate::error::Result;
use crate::search::eval::evaluate;
use crate::search::ordering::{score_captures, Heuristics};
use crate::search::see::{see_ge, see_value};
use crate::search::tt::{Bound, Stored, Tt, MATE, MATE_BOUND, MAX_PLY};

/// Larger than any reachable score.
pub const INF: i32 = MATE + 1;
/// The clock is read when `nodes & NODE_CHECK == 0`.
pub const NODE_CHECK: u64 = 2047;
pub const MAX_QPLY: usize = 32;

const DELTA_MARGIN: i32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub depth: u32,
    pub movetime_ms: Option<u64>,
    pub max_nodes: Option<u64>,
    pub use_tt: bool,
    pub use_nullmove: bool,
    pub use_lmr: bool,
    pub use_futility: bool,
    pub use_razoring: bool,
    pub use_lmp: bool,
    pub use_see_pruning: bool,
    pub use_killers: bool,
    pub use_history: bool,
    pub use_counter_moves: bool,
    pub use_quiescence: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            depth: 64,
            movetime_ms: None,
            max_nodes: None,
            use_tt: true,
            use_nullmove: true,
            use_lmr: true,
            use_futility: true,
            use_razoring: true,
            use_lmp: true,
            use_see_pruning: true,
            use_killers: true,
            use_history: true,
            use_counter_moves: true,
            use_quiescence: true,
        }
    }
}

impl SearchParams {
    /// Full-width alpha-beta with no selectivity; only the TT and ordering.
    pub fn plain() -> Self {
        Self {
            use_nullmove: false,
            use_lmr: false,
            use_futility: false,
            use_razoring: false,
            use_lmp: false,
            use_see_pruning: false,
            ..Self::default()
        }
    }

    pub fn movetime(&self) -> Option<Duration> {
        self.movetime_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    pub score_cp: i32,
    pub depth: u32,
    pub seldepth: usize,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// Scratch state owned by one search: per-ply move buffers, the PV table,
/// ordering heuristics, counters and the stop latch.
pub struct SearchContext {
    stack: Vec<MoveList>,
    pv: Vec<[Move; MAX_PLY]>,
    pv_len: [usize; MAX_PLY],
    pub heuristics: Heuristics,
    nodes: u64,
    node_limit: u64,
    deadline: Option<Instant>,
    stopped: bool,
    seldepth: usize,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self {
            stack: vec![MoveList::default(); MAX_PLY],
            pv: vec![[Move::default(); MAX_PLY]; MAX_PLY],
            pv_len: [0; MAX_PLY],
            heuristics: Heuristics::default(),
            nodes: 0,
            node_limit: u64::MAX,
            deadline: None,
            stopped: false,
            seldepth: 0,
        }
    }
}

impl SearchContext {
    fn reset(&mut self, params: &SearchParams, start: Instant) {
        self.heuristics.clear();
        self.heuristics.use_killers = params.use_killers;
        self.heuristics.use_history = params.use_history;
        self.heuristics.use_counters = params.use_counter_moves;
        self.pv_len = [0; MAX_PLY];
        self.nodes = 0;
        self.node_limit = params.max_nodes.unwrap_or(u64::MAX);
        self.deadline = params.movetime().map(|d| start + d);
        self.stopped = false;
        self.seldepth = 0;
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_len[ply + 1].max(ply + 1);
        let (head, tail) = self.pv.split_at_mut(ply + 1);
        let row = &mut head[ply];
        row[ply] = mv;
        row[ply + 1..child_len].copy_from_slice(&tail[0][ply + 1..child_len]);
        self.pv_len[ply] = child_len;
    }

    fn root_pv(&self) -> Vec<Move> {
        self.pv[0][..self.pv_len[0]].to_vec()
    }
}

#[inline]
fn mated_score(side: Color, ply: usize) -> i32 {
    // The side to move is mated: worst possible for it, shallower is worse.
    match side {
        Color::White => -(MATE - ply as i32),
        Color::Black => MATE - ply as i32,
    }
}

/// Iterative-deepening alpha-beta searcher. Scores are centipawns from
/// White's point of view; White maximizes.
pub struct Searcher {
    tt: Tt,
    ctx: Box<SearchContext>,
    params: SearchParams,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchParams::default())
    }
}

impl Searcher {
    pub fn new(params: SearchParams) -> Self {
        Self { tt: Tt::new(), ctx: Box::default(), params }
    }

    pub fn with_hash_mb(mb: usize, params: SearchParams) -> Result<Self> {
        Ok(Self { tt: Tt::with_capacity_mb(mb)?, ctx: Box::default(), params })
    }

    pub fn set_tt_capacity_mb(&mut self, mb: usize) -> Result<()> {
        self.tt.resize_mb(mb)
    }

    pub fn clear_hash(&mut self) {
        self.tt.clear();
    }

    pub fn tt(&self) -> &Tt {
        &self.tt
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    pub fn nodes(&self) -> u64 {
        self.ctx.nodes
    }

    /// Best move for `side` within `time_limit`, bounded by the configured
    /// depth. `None` when `side` has no legal move.
    pub fn find_move(&mut self, pos: &mut Position, side: Color, time_limit: Duration) -> Option<Move> {
        let mut params = self.params;
        params.movetime_ms = Some(time_limit.as_millis().min(u64::MAX as u128) as u64);
        self.search(pos, side, params).bestmove
    }

    pub fn search_depth(&mut self, pos: &mut Position, depth: u32) -> SearchResult {
        let params = SearchParams { depth, movetime_ms: None, ..self.params };
        let side = pos.side_to_move();
        self.search(pos, side, params)
    }

    pub fn search_with_params(&mut self, pos: &mut Position, params: SearchParams) -> SearchResult {
        let side = pos.side_to_move();
        self.search(pos, side, params)
    }

    /// Quiescence value of the position, for diagnostics and benches.
    pub fn qsearch_eval_cp(&mut self, pos: &mut Position) -> i32 {
        let params = SearchParams { movetime_ms: None, max_nodes: None, ..self.params };
        self.ctx.reset(&params, Instant::now());
        let saved = self.params;
        self.params = params;
        let side = pos.side_to_move();
        let v = self.quiescence(pos, side, -INF, INF, 0, 0);
        self.params = saved;
        v
    }

    pub fn search(&mut self, pos: &mut Position, side: Color, params: SearchParams) -> SearchResult {
        attacks::init();
        let start = Instant::now();
        let saved = std::mem::replace(&mut self.params, params);
        self.ctx.reset(&params, start);
        self.tt.new_search();

        // Passing the turn while in check would hand `side` the king.
        if pos.side_to_move() != side && pos.in_check(!side) {
            self.params = saved;
            info!("search skipped: {:?} to move is in check", !side);
            return SearchResult::default();
        }

        // Searching for the side not on move: pass the turn first.
        let null = (pos.side_to_move() != side).then(|| pos.make_null());
        let result = self.iterate(pos, side, start);
        if let Some(undo) = null {
            pos.unmake_null(undo);
        }
        self.params = saved;

        info!(
            "search done: best {} score {} depth {} nodes {} in {:?}",
            result.bestmove.map_or_else(|| "(none)".to_string(), |m| m.to_uci()),
            result.score_cp,
            result.depth,
            result.nodes,
            start.elapsed()
        );
        result
    }

    fn iterate(&mut self, pos: &mut Position, side: Color, start: Instant) -> SearchResult {
        let mut root = MoveList::new();
        generate(pos, side, GenMode::Legal, &mut root);
        if root.is_empty() {
            let score = if pos.in_check(side) { mated_score(side, 0) } else { 0 };
            return SearchResult { score_cp: score, ..Default::default() };
        }

        let mut result = SearchResult { bestmove: Some(root[0]), ..Default::default() };
        let max_depth = self.params.depth.clamp(1, MAX_PLY as u32 - 2);
        let movetime = self.params.movetime();

        for depth in 1..=max_depth {
            let score = self.alphabeta(pos, depth as i32, side, -INF, INF, 0, None, true);
            if self.ctx.stopped {
                debug!("depth {depth} interrupted after {} nodes", self.ctx.nodes);
                break;
            }
            let pv = self.ctx.root_pv();
            if let Some(&first) = pv.first() {
                result.bestmove = Some(first);
            }
            result.score_cp = score;
            result.depth = depth;
            result.seldepth = self.ctx.seldepth;
            result.pv = pv;
            debug!(
                "depth {} seldepth {} score {} nodes {} time {:?} pv {}",
                depth,
                self.ctx.seldepth,
                score,
                self.ctx.nodes,
                start.elapsed(),
                result.pv.iter().map(|m| m.to_uci()).collect::<Vec<_>>().join(" ")
            );

            // A forced mate within the searched horizon will not improve.
            if score.abs() > MATE_BOUND && MATE - score.abs() <= depth as i32 {
                break;
            }
            // Not enough time left for another iteration to finish.
            if movetime.is_some_and(|limit| start.elapsed() * 2 > limit) {
                break;
            }
        }
        result.nodes = self.ctx.nodes;
        result
    }

    #[inline]
    fn out_of_time(&mut self) -> bool {
        if self.ctx.stopped {
            return true;
        }
        if self.ctx.nodes & NODE_CHECK != 0 {
            return false;
        }
        if self.ctx.nodes >= self.ctx.node_limit || self.ctx.deadline.is_some_and(|d| Instant::now() >= d) {
            self.ctx.stopped = true;
        }
        self.ctx.stopped
    }

    #[allow(clippy::too_many_arguments)]
    fn alphabeta(
        &mut self,
        pos: &mut Position,
        mut depth: i32,
        side: Color,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        prev: Option<Move>,
        allow_null: bool,
    ) -> i32 {
        self.ctx.pv_len[ply] = ply;
        self.ctx.nodes += 1;
        if self.out_of_time() || ply >= MAX_PLY - 1 {
            return evaluate(pos);
        }
        self.ctx.seldepth = self.ctx.seldepth.max(ply);

        let maximizing = side == Color::White;
        let root = ply == 0;
        let is_pv = beta - alpha > 1;
        let in_check = pos.in_check(side);
        if in_check {
            depth += 1;
        }
        let (alpha0, beta0) = (alpha, beta);
        let hash = pos.hash();

        let mut tt_move = None;
        if self.params.use_tt {
            let probe = self.tt.probe(hash, depth, alpha, beta, ply);
            if let Some(score) = probe.score {
                if !root && !is_pv {
                    return score;
                }
            }
            tt_move = probe.best;
        }

        if depth <= 0 {
            return if self.params.use_quiescence {
                self.quiescence(pos, side, alpha, beta, ply, 0)
            } else {
                evaluate(pos)
            };
        }

        let static_eval = if in_check { 0 } else { evaluate(pos) };

        if !is_pv && !root && !in_check {
            // Reverse futility: the static eval already clears the bound by a margin.
            if self.params.use_futility && depth <= 3 {
                let margin = 120 * depth;
                if maximizing && static_eval - margin >= beta {
                    return static_eval - margin;
                }
                if !maximizing && static_eval + margin <= alpha {
                    return static_eval + margin;
                }
            }

            if self.params.use_razoring && depth <= 2 {
                let margin = 300 + 200 * (depth - 1);
                if maximizing && static_eval + margin <= alpha {
                    let v = self.quiescence(pos, side, alpha, alpha + 1, ply, 0);
                    if v <= alpha {
                        return v;
                    }
                } else if !maximizing && static_eval - margin >= beta {
                    let v = self.quiescence(pos, side, beta - 1, beta, ply, 0);
                    if v >= beta {
                        return v;
                    }
                }
            }

            let eval_beyond = if maximizing { static_eval >= beta } else { static_eval <= alpha };
            if self.params.use_nullmove
                && allow_null
                && depth >= 3
                && eval_beyond
                && pos.has_non_pawn_material(side)
                && alpha.abs() < MATE_BOUND
                && beta.abs() < MATE_BOUND
            {
                let r = 2 + depth / 4;
                let undo = pos.make_null();
                let v = if maximizing {
                    self.alphabeta(pos, depth - 1 - r, !side, beta - 1, beta, ply + 1, None, false)
                } else {
                    self.alphabeta(pos, depth - 1 - r, !side, alpha, alpha + 1, ply + 1, None, false)
                };
                pos.unmake_null(undo);
                if self.ctx.stopped {
                    return static_eval;
                }
                // Fail with the bound itself; a null-move mate proves nothing.
                if maximizing && v >= beta {
                    return beta;
                }
                if !maximizing && v <= alpha {
                    return alpha;
                }
            }
        }

        generate(pos, side, GenMode::Legal, &mut self.ctx.stack[ply]);
        let n = self.ctx.stack[ply].len();
        if n == 0 {
            return if in_check { mated_score(side, ply) } else { 0 };
        }
        self.ctx.heuristics.score_moves(pos, side, &mut self.ctx.stack[ply], tt_move, ply, prev);

        let mut best = if maximizing { -INF } else { INF };
        let mut best_move: Option<Move> = None;
        let mut searched = 0usize;

        for i in 0..n {
            let mv = self.ctx.stack[ply].pick_next(i);
            let capture = pos.is_capture(&mv, side);
            let quiet = !capture && mv.promotion.is_none();
            let can_prune = !root && !in_check && searched > 0 && best.abs() < MATE_BOUND;

            if can_prune && capture && self.params.use_see_pruning && depth <= 4 && !see_ge(pos, &mv, side, -100 * depth) {
                continue;
            }

            let undo = pos.make(mv, side);
            let gives_check = pos.in_check(!side);

            if can_prune && quiet && !gives_check {
                let late = self.params.use_lmp && depth <= 3 && searched >= 3 + (depth * depth) as usize;
                let futile = self.params.use_futility && !is_pv && depth <= 2 && {
                    let margin = 100 + 150 * depth;
                    if maximizing { static_eval + margin <= alpha } else { static_eval - margin >= beta }
                };
                if late || futile {
                    pos.unmake(mv, side, &undo);
                    continue;
                }
            }

            searched += 1;
            let new_depth = depth - 1;
            let score = if searched == 1 {
                self.alphabeta(pos, new_depth, !side, alpha, beta, ply + 1, Some(mv), true)
            } else {
                let mut r = 0;
                if self.params.use_lmr && depth >= 3 && searched > 3 && quiet && !in_check && !gives_check {
                    r = 1 + (searched > 8) as i32 + (depth >= 6) as i32 - is_pv as i32;
                    r = r.max(0).min(new_depth - 1);
                }
                // Null window on the side of the bound this node can move.
                let (na, nb) = if maximizing { (alpha, alpha + 1) } else { (beta - 1, beta) };
                let raises = |s: i32| if maximizing { s > alpha } else { s < beta };
                let mut s = self.alphabeta(pos, new_depth - r, !side, na, nb, ply + 1, Some(mv), true);
                if r > 0 && raises(s) {
                    s = self.alphabeta(pos, new_depth, !side, na, nb, ply + 1, Some(mv), true);
                }
                let inside = if maximizing { s < beta } else { s > alpha };
                if raises(s) && inside {
                    s = self.alphabeta(pos, new_depth, !side, alpha, beta, ply + 1, Some(mv), true);
                }
                s
            };
            pos.unmake(mv, side, &undo);

            if self.ctx.stopped {
                return if best_move.is_some() { best } else { score };
            }

            if maximizing {
                if score > best {
                    best = score;
                    best_move = Some(mv);
                    if score > alpha {
                        alpha = score;
                        self.ctx.update_pv(ply, mv);
                    }
                }
            } else if score < best {
                best = score;
                best_move = Some(mv);
                if score < beta {
                    beta = score;
                    self.ctx.update_pv(ply, mv);
                }
            }

            if alpha >= beta {
                if quiet {
                    let h = &mut self.ctx.heuristics;
                    if h.use_killers {
                        h.store_killer(ply, mv);
                    }
                    if h.use_history {
                        h.reward(side, &mv, depth);
                    }
                    if h.use_counters {
                        h.set_counter(side, prev, mv);
                    }
                }
                break;
            }
        }

        if self.params.use_tt {
            let bound = if maximizing {
                if best >= beta0 {
                    Bound::Lower
                } else if best > alpha0 {
                    Bound::Exact
                } else {
                    Bound::Upper
                }
            } else if best <= alpha0 {
                Bound::Upper
            } else if best < beta0 {
                Bound::Exact
            } else {
                Bound::Lower
            };
            self.tt.store(hash, depth, best, bound, best_move.map(|m| m.pack()), ply);
        }
        best
    }

    fn quiescence(&mut self, pos: &mut Position, side: Color, mut alpha: i32, mut beta: i32, ply: usize, qply: usize) -> i32 {
        self.ctx.pv_len[ply] = ply;
        self.ctx.nodes += 1;
        if self.out_of_time() || ply >= MAX_PLY - 1 || qply >= MAX_QPLY {
            return evaluate(pos);
        }
        self.ctx.seldepth = self.ctx.seldepth.max(ply);

        let maximizing = side == Color::White;
        let in_check = pos.in_check(side);
        let stand = (!in_check).then(|| evaluate(pos));

        let mut best = match stand {
            Some(s) => {
                if maximizing {
                    if s >= beta {
                        return s;
                    }
                    alpha = alpha.max(s);
                } else {
                    if s <= alpha {
                        return s;
                    }
                    beta = beta.min(s);
                }
                generate_captures(pos, side, &mut self.ctx.stack[ply]);
                s
            }
            None => {
                // In check: every reply is searched.
                generate(pos, side, GenMode::Pseudo, &mut self.ctx.stack[ply]);
                if maximizing { -INF } else { INF }
            }
        };
        score_captures(pos, side, &mut self.ctx.stack[ply]);

        let n = self.ctx.stack[ply].len();
        let mut legal = 0;
        for i in 0..n {
            let mv = self.ctx.stack[ply].pick_next(i);
            if let Some(s) = stand {
                let swing = pos.captured_kind(&mv, side).map_or(0, see_value)
                    + mv.promotion.map_or(0, |p| see_value(p) - 100)
                    + DELTA_MARGIN;
                if (maximizing && s + swing <= alpha) || (!maximizing && s - swing >= beta) {
                    continue;
                }
                if self.params.use_see_pruning && !see_ge(pos, &mv, side, 0) {
                    continue;
                }
            }

            let undo = pos.make(mv, side);
            if pos.in_check(side) {
                pos.unmake(mv, side, &undo);
                continue;
            }
            legal += 1;
            let score = self.quiescence(pos, !side, alpha, beta, ply + 1, qply + 1);
            pos.unmake(mv, side, &undo);
            if self.ctx.stopped {
                return score;
            }

            if maximizing {
                if score > best {
                    best = score;
                    alpha = alpha.max(score);
                }
            } else if score < best {
                best = score;
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }

        if in_check && legal == 0 {
            return mated_score(side, ply);
        }
        best
    }

    /// Table entry for the position, if present.
    pub fn tt_probe(&self, pos: &Position) -> Option<Stored> {
        self.tt.peek(pos.hash())
    }
}
