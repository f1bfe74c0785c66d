use bitsearch::search::alphabeta::Searcher;
use bitsearch::Position;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_qsearch(c: &mut Criterion) {
    let start = Position::startpos();
    let tactical = Position::from_fen(KIWIPETE).unwrap();
    c.bench_function("qsearch_startpos", |ben| {
        let mut s = Searcher::default();
        ben.iter(|| {
            let mut pos = start;
            black_box(s.qsearch_eval_cp(black_box(&mut pos)))
        })
    });
    c.bench_function("qsearch_kiwipete", |ben| {
        let mut s = Searcher::default();
        ben.iter(|| {
            let mut pos = tactical;
            black_box(s.qsearch_eval_cp(black_box(&mut pos)))
        })
    });
}

criterion_group!(benches, bench_qsearch);
criterion_main!(benches);
