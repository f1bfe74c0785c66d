use std::time::Duration;

use bitsearch::search::alphabeta::{SearchParams, Searcher};
use bitsearch::search::tt::{MATE, MATE_BOUND};
use bitsearch::{Color, Position};

#[test]
fn finds_back_rank_mate_in_one() {
    let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let mut s = Searcher::default();
    let res = s.search_depth(&mut pos, 4);
    assert_eq!(res.bestmove.map(|m| m.to_uci()).as_deref(), Some("a1a8"));
    assert_eq!(res.score_cp, MATE - 1);
}

#[test]
fn black_mates_with_negative_score() {
    let mut pos = Position::from_fen("r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
    let mut s = Searcher::default();
    let res = s.search_depth(&mut pos, 4);
    assert_eq!(res.bestmove.map(|m| m.to_uci()).as_deref(), Some("a8a1"));
    assert_eq!(res.score_cp, -(MATE - 1));
}

#[test]
fn plain_search_finds_mate_in_two() {
    // Rook ladder: 1. Ra7 and 2. Rb8 mates whatever Black does.
    let mut pos = Position::from_fen("6k1/8/8/8/8/8/R7/1R4K1 w - - 0 1").unwrap();
    let mut s = Searcher::new(SearchParams::plain());
    let res = s.search_depth(&mut pos, 5);
    assert!(res.score_cp > MATE_BOUND, "no mate found: {}", res.score_cp);
    assert_eq!(res.score_cp, MATE - 3);
}

#[test]
fn stalemate_returns_none() {
    let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(!pos.in_check(Color::Black));
    let mut s = Searcher::default();
    assert_eq!(s.find_move(&mut pos, Color::Black, Duration::from_millis(200)), None);
    let res = s.search_depth(&mut pos, 3);
    assert_eq!(res.bestmove, None);
    assert_eq!(res.score_cp, 0);
}

#[test]
fn checkmated_side_returns_none() {
    let mut pos = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert!(pos.in_check(Color::Black));
    let mut s = Searcher::default();
    assert_eq!(s.find_move(&mut pos, Color::Black, Duration::from_millis(200)), None);
    assert_eq!(s.search_depth(&mut pos, 2).score_cp, MATE);
}
