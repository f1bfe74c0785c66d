use bitsearch::board::movegen::{generate, GenMode};
use bitsearch::board::MoveList;
use bitsearch::perft::perft;
use bitsearch::Position;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_perft(c: &mut Criterion) {
    let start = Position::startpos();
    c.bench_function("perft_4_startpos", |ben| {
        ben.iter(|| {
            let mut pos = start;
            black_box(perft(black_box(&mut pos), 4))
        })
    });

    let kiwi = Position::from_fen(KIWIPETE).unwrap();
    c.bench_function("perft_3_kiwipete", |ben| {
        ben.iter(|| {
            let mut pos = kiwi;
            black_box(perft(black_box(&mut pos), 3))
        })
    });
}

fn bench_movegen(c: &mut Criterion) {
    let kiwi = Position::from_fen(KIWIPETE).unwrap();
    c.bench_function("legal_movegen_kiwipete", |ben| {
        let mut list = MoveList::new();
        ben.iter(|| {
            let mut pos = kiwi;
            let side = pos.side_to_move();
            generate(black_box(&mut pos), side, GenMode::Legal, &mut list);
            black_box(list.len())
        })
    });
}

criterion_group!(benches, bench_perft, bench_movegen);
criterion_main!(benches);
