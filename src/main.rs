use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use bitsearch::board::legal_moves;
use bitsearch::board::movegen::find_uci_move;
use bitsearch::board::moves::parse_uci;
use bitsearch::book::OpeningBook;
use bitsearch::config::EngineConfig;
use bitsearch::uci::UciEngine;
use bitsearch::{execute, Color, Position, Searcher, START_FEN};
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bitboard alpha-beta chess engine", long_about = None)]
struct Args {
    /// Engine configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Transposition table size in MiB, overrides the config
    #[arg(long, global = true)]
    hash: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak UCI on stdin/stdout (default)
    Uci,
    /// Play a game in the terminal
    Play {
        /// Engine plays White
        #[arg(long)]
        white: bool,
        /// Engine plays Black
        #[arg(long)]
        black: bool,
        /// Seconds per engine move
        #[arg(long)]
        time: Option<f64>,
        /// Maximum search depth
        #[arg(long)]
        depth: Option<u32>,
        /// Opening book (JSON lines); built-in lines when omitted
        #[arg(long)]
        book: Option<PathBuf>,
        /// Starting FEN
        #[arg(long)]
        fen: Option<String>,
    },
    /// Print the best move for a position as `from*64+to` and UCI text
    Bestmove {
        #[arg(long, default_value = START_FEN)]
        fen: String,
        #[arg(long)]
        depth: Option<u32>,
        /// Seconds to think
        #[arg(long)]
        time: Option<f64>,
    },
}

fn color_name(c: Color) -> &'static str {
    match c {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(mb) = args.hash {
        config.hash_mb = mb;
    }
    Ok(config)
}

fn bestmove(config: &EngineConfig, fen: &str) -> Result<()> {
    let mut pos = Position::from_fen(fen).context("parsing --fen")?;
    let mut searcher = Searcher::with_hash_mb(config.hash_mb, config.search)?;
    let side = pos.side_to_move();
    match searcher.find_move(&mut pos, side, config.move_time()) {
        Some(mv) => println!("{} {}", mv.encode(), mv.to_uci()),
        None => println!("-1"),
    }
    Ok(())
}

fn read_human_move(pos: &mut Position) -> Result<Option<String>> {
    let stdin = io::stdin();
    loop {
        print!("Your move (e.g. e2e4, 'quit' to stop): ");
        io::stdout().flush()?;
        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let text = input.trim().to_ascii_lowercase();
        if text == "quit" {
            return Ok(None);
        }
        let Some((from, to, promo)) = parse_uci(&text) else {
            println!("Could not read '{text}'; use from-to squares like e2e4 or e7e8q.");
            continue;
        };
        // Resolve before executing so the history carries the move actually played.
        let played = find_uci_move(pos, &text)
            .or_else(|| find_uci_move(pos, &format!("{text}q")))
            .map(|m| m.to_uci());
        if execute(pos, from, to, promo) {
            return Ok(Some(played.unwrap_or(text)));
        }
        println!("Illegal move!");
    }
}

fn play(config: &EngineConfig, white: bool, black: bool, book_path: Option<PathBuf>, fen: Option<String>) -> Result<()> {
    let mut pos = match fen {
        Some(f) => Position::from_fen(&f).context("parsing --fen")?,
        None => Position::startpos(),
    };
    let mut book = OpeningBook::builtin();
    if let Some(path) = book_path.or_else(|| config.book.clone()) {
        book = OpeningBook::new();
        book.load_json(&path).with_context(|| format!("loading book {}", path.display()))?;
    }
    let mut searcher = Searcher::with_hash_mb(config.hash_mb, config.search)?;
    let mut rng = SmallRng::from_entropy();
    let mut history: Vec<String> = Vec::new();

    loop {
        let side = pos.side_to_move();
        println!("\n{}", pos.pretty());
        if legal_moves(&mut pos, side).is_empty() {
            if pos.in_check(side) {
                println!("Checkmate! {} wins.", color_name(!side));
            } else {
                println!("Stalemate.");
            }
            break;
        }
        if pos.in_check(side) {
            println!("{} is in check.", color_name(side));
        }

        let engine_turn = match side {
            Color::White => white,
            Color::Black => black,
        };
        if engine_turn {
            let book_move = book
                .get_book_move(&history, &mut rng)
                .and_then(|node| find_uci_move(&mut pos, &node.uci));
            let (mv, source) = match book_move {
                Some(mv) => (mv, "book"),
                None => {
                    let t0 = Instant::now();
                    let Some(mv) = searcher.find_move(&mut pos, side, config.move_time()) else {
                        break;
                    };
                    info!("searched {} nodes in {:?}", searcher.nodes(), t0.elapsed());
                    (mv, "search")
                }
            };
            println!("{} plays {} ({}, {})", color_name(side), mv, mv.encode(), source);
            pos.make(mv, side);
            history.push(mv.to_uci());
        } else {
            let Some(text) = read_human_move(&mut pos)? else {
                break;
            };
            history.push(text);
        }

        let (plies, name) = book.line_info(&history);
        if plies == history.len() {
            if let Some(name) = name {
                println!("Opening: {name}");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = load_config(&args)?;

    match args.command.unwrap_or(Command::Uci) {
        Command::Uci => {
            let mut engine = UciEngine::with_config(&config)?;
            engine.run_loop()?;
        }
        Command::Play { white, black, time, depth, book, fen } => {
            if let Some(t) = time {
                config.move_time_secs = t;
            }
            if let Some(d) = depth {
                config.search.depth = d;
            }
            play(&config, white, black, book, fen)?;
        }
        Command::Bestmove { fen, depth, time } => {
            if let Some(t) = time {
                config.move_time_secs = t;
            }
            if let Some(d) = depth {
                config.search.depth = d;
            }
            bestmove(&config, &fen)?;
        }
    }
    Ok(())
}
