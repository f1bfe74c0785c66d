use bitsearch::board::movegen::find_uci_move;
use bitsearch::search::see::see;
use bitsearch::Position;

fn see_of(fen: &str, uci: &str) -> i32 {
    let mut pos = Position::from_fen(fen).unwrap();
    let mv = find_uci_move(&mut pos, uci).unwrap();
    see(&pos, &mv, pos.side_to_move())
}

#[test]
fn bishop_takes_hanging_queen() {
    assert_eq!(see_of("4k3/8/8/8/5Q2/8/8/2b4K b - - 0 1", "c1f4"), 900);
}

#[test]
fn queen_takes_defended_pawn() {
    assert_eq!(see_of("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1", "d1d5"), 100 - 900);
}

#[test]
fn rook_behind_rook_joins_the_exchange() {
    assert_eq!(see_of("4k3/3r4/8/3p4/8/8/3R4/3RK3 w - - 0 1", "d2d5"), 100);
}

#[test]
fn king_recaptures_only_uncovered_squares() {
    assert_eq!(see_of("8/8/8/3p4/4k3/8/8/3RK3 w - - 0 1", "d1d5"), 100 - 500);
    assert_eq!(see_of("B7/8/8/3p4/4k3/8/8/3RK3 w - - 0 1", "d1d5"), 100);
}

#[test]
fn quiet_move_to_attacked_square_loses_the_piece() {
    assert_eq!(see_of("4k3/8/8/2p5/8/8/8/3RK3 w - - 0 1", "d1d4"), -500);
}
