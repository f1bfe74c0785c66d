use bitsearch::board::types::{parse_square, Square};
use bitsearch::{execute, Color, PieceKind, Position};
use pretty_assertions::assert_eq;

fn sq(name: &str) -> Square {
    parse_square(name).unwrap()
}

fn rejects(fen: &str, from: &str, to: &str) {
    let mut pos = Position::from_fen(fen).unwrap();
    let before = pos;
    assert!(!execute(&mut pos, sq(from), sq(to), None), "{from}{to} accepted in {fen}");
    assert_eq!(pos, before, "rejected move changed the position");
}

#[test]
fn legal_moves_are_applied_and_turn_passes() {
    let mut pos = Position::startpos();
    assert!(execute(&mut pos, sq("e2"), sq("e4"), None));
    assert_eq!(pos.side_to_move(), Color::Black);
    assert_eq!(pos.piece_at(sq("e4")), Some((Color::White, PieceKind::Pawn)));
    assert!(execute(&mut pos, sq("e7"), sq("e5"), None));
    assert_eq!(pos.side_to_move(), Color::White);
}

#[test]
fn rejects_moving_the_opponents_piece() {
    rejects(bitsearch::START_FEN, "e7", "e5");
}

#[test]
fn rejects_unreachable_destination() {
    rejects(bitsearch::START_FEN, "e2", "e5");
    rejects(bitsearch::START_FEN, "g1", "g3");
    rejects(bitsearch::START_FEN, "e3", "e4");
}

#[test]
fn rejects_off_board_squares() {
    let mut pos = Position::startpos();
    assert!(!execute(&mut pos, 64, 0, None));
    assert!(!execute(&mut pos, 12, 200, None));
}

#[test]
fn rejects_moving_a_pinned_piece() {
    rejects("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1", "e2", "c3");
}

#[test]
fn rejects_castling_through_attacked_square() {
    let fen = "4k3/8/8/8/8/8/5r2/R3K2R w KQ - 0 1";
    rejects(fen, "e1", "g1");
    let mut pos = Position::from_fen(fen).unwrap();
    assert!(execute(&mut pos, sq("e1"), sq("c1"), None));
    assert_eq!(pos.piece_at(sq("d1")), Some((Color::White, PieceKind::Rook)));
    assert_eq!(pos.castling() & 3, 0, "white keeps castling rights after castling");
}

#[test]
fn promotion_defaults_to_queen_and_accepts_underpromotion() {
    let fen = "8/P6k/8/8/8/8/8/K7 w - - 0 1";
    let mut pos = Position::from_fen(fen).unwrap();
    assert!(execute(&mut pos, sq("a7"), sq("a8"), None));
    assert_eq!(pos.piece_at(sq("a8")), Some((Color::White, PieceKind::Queen)));

    let mut pos = Position::from_fen(fen).unwrap();
    assert!(execute(&mut pos, sq("a7"), sq("a8"), Some(PieceKind::Knight)));
    assert_eq!(pos.piece_at(sq("a8")), Some((Color::White, PieceKind::Knight)));

    let mut pos = Position::from_fen(fen).unwrap();
    assert!(!execute(&mut pos, sq("a7"), sq("a8"), Some(PieceKind::King)));
}

#[test]
fn en_passant_capture_removes_the_pawn() {
    let mut pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    assert!(execute(&mut pos, sq("e5"), sq("d6"), None));
    assert_eq!(pos.piece_at(sq("d5")), None);
    assert_eq!(pos.piece_at(sq("d6")), Some((Color::White, PieceKind::Pawn)));
}

#[test]
fn promotions_are_four_distinct_moves() {
    let mut pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let promos: Vec<_> = bitsearch::board::legal_moves(&mut pos, Color::White)
        .into_iter()
        .filter(|m| m.from == sq("a7"))
        .collect();
    let kinds: Vec<_> = promos.iter().map(|m| m.promotion).collect();
    assert_eq!(
        kinds,
        vec![Some(PieceKind::Queen), Some(PieceKind::Rook), Some(PieceKind::Bishop), Some(PieceKind::Knight)]
    );
    assert_ne!(promos[0], promos[3]);
    let mut scored = promos[3];
    scored.score = 12345;
    assert_eq!(scored, promos[3], "ordering score takes no part in equality");
}
