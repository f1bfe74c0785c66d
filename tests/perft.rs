mod common;

use bitsearch::perft::{divide, perft};
use bitsearch::Position;
use common::{KIWIPETE, POSITION_3};

fn count(fen: &str, depth: u32) -> u64 {
    let mut pos = Position::from_fen(fen).expect("valid fen");
    perft(&mut pos, depth)
}

#[test]
fn perft_startpos_small_depths() {
    let mut b = Position::startpos();
    assert_eq!(perft(&mut b, 1), 20);
    assert_eq!(perft(&mut b, 2), 400);
    assert_eq!(perft(&mut b, 3), 8902);
    assert_eq!(perft(&mut b, 4), 197281);
}

#[test]
fn perft_kiwipete() {
    assert_eq!(count(KIWIPETE, 1), 48);
    assert_eq!(count(KIWIPETE, 2), 2039);
    assert_eq!(count(KIWIPETE, 3), 97862);
}

#[test]
fn perft_position_3_en_passant_and_pins() {
    assert_eq!(count(POSITION_3, 1), 14);
    assert_eq!(count(POSITION_3, 2), 191);
    assert_eq!(count(POSITION_3, 3), 2812);
    assert_eq!(count(POSITION_3, 4), 43238);
}

#[test]
fn perft_position_4_promotions_and_castling() {
    let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    assert_eq!(count(fen, 1), 6);
    assert_eq!(count(fen, 2), 264);
    assert_eq!(count(fen, 3), 9467);
}

#[test]
fn perft_position_5() {
    let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
    assert_eq!(count(fen, 1), 44);
    assert_eq!(count(fen, 2), 1486);
    assert_eq!(count(fen, 3), 62379);
}

#[test]
fn divide_sums_to_perft_and_leaves_position_intact() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    let before = pos;
    let split = divide(&mut pos, 2);
    assert_eq!(split.len(), 48);
    assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 2039);
    assert_eq!(pos, before);
}
