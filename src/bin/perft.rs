use std::time::Instant;

use anyhow::{Context, Result};
use bitsearch::board::movegen::{generate, GenMode};
use bitsearch::board::MoveList;
use bitsearch::perft::{divide, perft};
use bitsearch::{Position, START_FEN};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Counts leaf nodes of the legal move tree")]
struct Args {
    /// Search depth
    #[arg(long, default_value_t = 5)]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(long, default_value = "startpos")]
    fen: String,
    /// Print the count below each root move
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Worker threads for the root split
    #[arg(long, default_value_t = 1)]
    threads: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let fen = if args.fen == "startpos" { START_FEN } else { args.fen.as_str() };
    let base = Position::from_fen(fen).context("parsing --fen")?;
    let depth = args.depth;

    if args.divide {
        let mut pos = base;
        let t0 = Instant::now();
        let mut total = 0;
        for (mv, n) in divide(&mut pos, depth) {
            println!("{mv}: {n}");
            total += n;
        }
        let dt = t0.elapsed().as_secs_f64();
        println!("\nnodes: {total} elapsed: {dt:.3}s nps: {:.1}", total as f64 / dt.max(f64::EPSILON));
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.max(1))
        .build()
        .context("building thread pool")?;

    let side = base.side_to_move();
    let mut root = MoveList::new();
    let mut scratch = base;
    generate(&mut scratch, side, GenMode::Legal, &mut root);
    let root_moves: Vec<_> = root.iter().copied().collect();

    let bar = ProgressBar::new(root_moves.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} root moves")
            .context("progress template")?,
    );

    let t0 = Instant::now();
    let nodes: u64 = if depth == 0 {
        1
    } else {
        pool.install(|| {
            root_moves
                .par_iter()
                .map(|&mv| {
                    let mut pos = base;
                    pos.make(mv, side);
                    let n = perft(&mut pos, depth - 1);
                    bar.inc(1);
                    n
                })
                .sum()
        })
    };
    bar.finish_and_clear();
    let dt = t0.elapsed().as_secs_f64();
    println!("nodes: {nodes} elapsed: {dt:.3}s nps: {:.1}", nodes as f64 / dt.max(f64::EPSILON));
    Ok(())
}
