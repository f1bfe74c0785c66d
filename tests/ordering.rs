use bitsearch::board::movegen::{find_uci_move, generate, GenMode};
use bitsearch::board::{MoveList, PieceKind};
use bitsearch::search::alphabeta::{SearchParams, Searcher};
use bitsearch::search::ordering::{mvv_lva, Heuristics, HISTORY_MAX};
use bitsearch::{Color, Position};

#[test]
fn bands_order_tt_captures_killers_quiets_losing_captures() {
    let mut pos = Position::from_fen("4k3/2p5/3p4/8/8/8/3Q3n/4K3 w - - 0 1").unwrap();
    let tt = find_uci_move(&mut pos, "e1e2").unwrap();
    let good = find_uci_move(&mut pos, "d2h2").unwrap();
    let killer = find_uci_move(&mut pos, "d2a5").unwrap();
    let bad = find_uci_move(&mut pos, "d2d6").unwrap();

    let mut h = Heuristics::default();
    h.store_killer(3, killer);
    let mut list = MoveList::new();
    generate(&mut pos, Color::White, GenMode::Legal, &mut list);
    h.score_moves(&pos, Color::White, &mut list, Some(tt.pack()), 3, None);

    let n = list.len();
    let ordered: Vec<_> = (0..n).map(|i| list.pick_next(i)).collect();
    assert_eq!(ordered[0], tt);
    assert_eq!(ordered[1], good);
    assert_eq!(ordered[2], killer);
    assert_eq!(ordered[n - 1], bad);
}

#[test]
fn counter_move_ranks_above_plain_quiets() {
    let mut pos = Position::startpos();
    let prev = find_uci_move(&mut pos, "g1f3").unwrap();
    let side = pos.side_to_move();
    pos.make(prev, side);
    let reply = find_uci_move(&mut pos, "d7d5").unwrap();

    let mut h = Heuristics::default();
    h.set_counter(Color::Black, Some(prev), reply);
    assert_eq!(h.counter(Color::Black, Some(prev)), Some(reply));
    let mut list = MoveList::new();
    generate(&mut pos, Color::Black, GenMode::Legal, &mut list);
    h.score_moves(&pos, Color::Black, &mut list, None, 1, Some(prev));
    assert_eq!(list.pick_next(0), reply);
}

#[test]
fn history_halves_on_saturation() {
    let mut pos = Position::startpos();
    let mv = find_uci_move(&mut pos, "e2e4").unwrap();
    let other = find_uci_move(&mut pos, "d2d4").unwrap();
    let mut h = Heuristics::default();
    h.reward(Color::White, &other, 10);
    assert_eq!(h.history(Color::White, &other), 100);
    h.reward(Color::White, &mv, 1024);
    assert_eq!(h.history(Color::White, &mv), HISTORY_MAX / 2);
    assert_eq!(h.history(Color::White, &other), 50);
}

#[test]
fn mvv_lva_prefers_big_victims_then_small_attackers() {
    assert!(mvv_lva(PieceKind::Queen, PieceKind::Pawn) > mvv_lva(PieceKind::Queen, PieceKind::Queen));
    assert!(mvv_lva(PieceKind::Queen, PieceKind::Queen) > mvv_lva(PieceKind::Rook, PieceKind::Pawn));
    assert!(mvv_lva(PieceKind::Knight, PieceKind::Pawn) > mvv_lva(PieceKind::Pawn, PieceKind::Pawn));
}

#[test]
fn ordering_heuristics_do_not_change_exact_minimax() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1";
    let exact = SearchParams { depth: 3, use_tt: false, use_quiescence: false, ..SearchParams::plain() };
    let bare = SearchParams { use_killers: false, use_history: false, use_counter_moves: false, ..exact };

    let mut pos = Position::from_fen(fen).unwrap();
    let r1 = Searcher::default().search_with_params(&mut pos, bare);
    let r2 = Searcher::default().search_with_params(&mut pos, exact);
    assert_eq!(r1.score_cp, r2.score_cp, "ordering changed the minimax value");
}
