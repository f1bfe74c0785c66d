use bitsearch::search::alphabeta::{SearchParams, Searcher};
use bitsearch::Position;

const ITALIAN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3";

#[test]
fn selective_search_visits_fewer_nodes_than_plain() {
    let mut pos = Position::from_fen(ITALIAN).unwrap();
    let plain = Searcher::default().search_with_params(&mut pos, SearchParams { depth: 4, ..SearchParams::plain() });
    let selective = Searcher::default().search_with_params(&mut pos, SearchParams { depth: 4, ..SearchParams::default() });
    assert!(plain.bestmove.is_some() && selective.bestmove.is_some());
    assert!(selective.nodes < plain.nodes, "pruning did not reduce nodes: {} vs {}", selective.nodes, plain.nodes);
}

#[test]
fn nullmove_keeps_material_win() {
    // White wins the queen with Qe2xd2 whether or not null moves are tried.
    let fen = "k7/8/8/8/8/8/3qQ3/7K w - - 0 1";
    for use_nullmove in [false, true] {
        let mut pos = Position::from_fen(fen).unwrap();
        let p = SearchParams { depth: 4, use_nullmove, ..SearchParams::default() };
        let r = Searcher::default().search_with_params(&mut pos, p);
        assert_eq!(r.bestmove.map(|m| m.to_uci()).as_deref(), Some("e2d2"), "nullmove={use_nullmove}");
    }
}

#[test]
fn each_pruning_toggle_still_finds_mate_in_one() {
    let fen = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
    let toggles: [fn(&mut SearchParams); 7] = [
        |p| p.use_nullmove = false,
        |p| p.use_lmr = false,
        |p| p.use_futility = false,
        |p| p.use_razoring = false,
        |p| p.use_lmp = false,
        |p| p.use_see_pruning = false,
        |p| p.use_quiescence = false,
    ];
    for (i, off) in toggles.iter().enumerate() {
        let mut p = SearchParams { depth: 3, ..SearchParams::default() };
        off(&mut p);
        let mut pos = Position::from_fen(fen).unwrap();
        let r = Searcher::default().search_with_params(&mut pos, p);
        assert_eq!(r.bestmove.map(|m| m.to_uci()).as_deref(), Some("a1a8"), "toggle {i}");
    }
}
