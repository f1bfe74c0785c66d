use std::time::Duration;

use bitsearch::board::movegen::find_uci_move;
use bitsearch::search::alphabeta::{SearchParams, Searcher};
use bitsearch::search::eval::evaluate;
use bitsearch::{execute, Color, Position};
use pretty_assertions::assert_eq;

#[test]
fn eval_startpos_is_tempo_only() {
    let b = Position::startpos();
    let cp = evaluate(&b);
    assert!(cp.abs() <= 10, "startpos eval not near zero: {cp}");
}

#[test]
fn eval_is_color_symmetric() {
    let white = Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1").unwrap();
    let black = Position::from_fen("rnbqk2r/pppp1ppp/5n2/2b1p3/4P3/2N2N2/PPPP1PPP/R1BQKB1R b KQkq - 0 1").unwrap();
    assert_eq!(evaluate(&white), -evaluate(&black));
}

#[test]
fn search_returns_legal_move_startpos() {
    let mut b = Position::startpos();
    let mut searcher = Searcher::default();
    let res = searcher.search_depth(&mut b, 1);
    let mv = res.bestmove.expect("no move found at depth 1");
    assert!(find_uci_move(&mut b, &mv.to_uci()).is_some());
    assert!(res.nodes > 0);
    assert_eq!(res.depth, 1);
}

#[test]
fn search_prefers_winning_queen_capture() {
    let mut b = Position::from_fen("k7/8/8/8/8/8/3qQ3/7K w - - 0 1").unwrap();
    let mut searcher = Searcher::default();
    let res = searcher.search_depth(&mut b, 1);
    let bm = res.bestmove.expect("expected a best move");
    assert_eq!(bm.to_uci(), "e2d2", "expected Qe2xd2, got {bm}");
    assert!(res.score_cp > 500);
}

#[test]
fn search_leaves_position_untouched() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    let before = pos;
    let mut s = Searcher::default();
    s.search_depth(&mut pos, 4);
    assert_eq!(pos, before);
    assert_eq!(pos.to_fen(), fen);
}

#[test]
fn same_depth_same_move_and_pv() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1";
    let run = || {
        let mut pos = Position::from_fen(fen).unwrap();
        let mut s = Searcher::default();
        let r = s.search_depth(&mut pos, 5);
        (r.bestmove, r.pv, r.score_cp, r.nodes)
    };
    assert_eq!(run(), run());
}

#[test]
fn e2e4_e7e5_then_white_moves_safely_and_repeatably() {
    let mut pos = Position::startpos();
    assert!(execute(&mut pos, 12, 28, None));
    assert!(execute(&mut pos, 52, 36, None));
    let params = SearchParams { depth: 4, ..SearchParams::default() };

    let mut first = Searcher::new(params);
    let mv = first.find_move(&mut pos, Color::White, std::time::Duration::from_secs(60)).expect("white has moves");
    let mut after = pos;
    after.make(mv, Color::White);
    assert!(!after.in_check(Color::White), "{mv} leaves the king in check");

    let mut second = Searcher::new(params);
    let again = second.find_move(&mut pos, Color::White, std::time::Duration::from_secs(60));
    assert_eq!(again, Some(mv));
    assert_eq!(mv.encode(), mv.from as u16 * 64 + mv.to as u16);

    first.clear_hash();
    assert_eq!(first.find_move(&mut pos, Color::White, std::time::Duration::from_secs(60)), Some(mv));
}

#[test]
fn find_move_for_the_side_not_on_move() {
    let mut pos = Position::startpos();
    let mut s = Searcher::new(SearchParams { depth: 2, ..SearchParams::default() });
    let mv = s.find_move(&mut pos, Color::Black, std::time::Duration::from_secs(60)).unwrap();
    assert!(mv.from >= 48, "{mv} is not a black move");
    assert_eq!(pos, Position::startpos());
}

#[test]
fn no_move_for_the_waiting_side_while_the_mover_is_in_check() {
    // Black to move is in check; a White move would have to capture the king.
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/4R3/4K3 b - - 0 1").unwrap();
    let before = pos;
    let mut searcher = Searcher::default();
    assert_eq!(searcher.find_move(&mut pos, Color::White, Duration::from_millis(500)), None);
    assert_eq!(pos, before);

    let res = searcher.search(&mut pos, Color::White, SearchParams { depth: 3, ..SearchParams::default() });
    assert!(res.bestmove.is_none() && res.pv.is_empty());
    assert_eq!(pos, before);

    // Black itself still gets a reply.
    let reply = searcher.find_move(&mut pos, Color::Black, Duration::from_millis(500)).unwrap();
    assert!(execute(&mut pos, reply.from, reply.to, reply.promotion));
}
