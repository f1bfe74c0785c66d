use std::io::{self, BufRead, Write};

use log::{debug, warn};

use crate::board::movegen::find_uci_move;
use crate::board::{Color, Position};
use crate::config::EngineConfig;
use crate::search::alphabeta::{SearchParams, SearchResult, Searcher};
use crate::search::tt::{MATE, MATE_BOUND};

const DEFAULT_DEPTH: u32 = 8;

pub struct UciEngine {
    pos: Position,
    searcher: Searcher,
    params: SearchParams,
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// UCI `score` field, from the side to move's point of view.
fn score_field(result: &SearchResult, side: Color) -> String {
    let s = if side == Color::White { result.score_cp } else { -result.score_cp };
    if s.abs() > MATE_BOUND {
        let plies = MATE - s.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if s > 0 { moves } else { -moves })
    } else {
        format!("cp {s}")
    }
}

impl UciEngine {
    pub fn new() -> Self {
        Self { pos: Position::startpos(), searcher: Searcher::default(), params: SearchParams::default() }
    }

    pub fn with_config(config: &EngineConfig) -> crate::error::Result<Self> {
        Ok(Self {
            pos: Position::startpos(),
            searcher: Searcher::with_hash_mb(config.hash_mb, config.search)?,
            params: config.search,
        })
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    fn cmd_uci(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name bitsearch {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author bitsearch developers")?;
        writeln!(out, "option name Hash type spin default 64 min 1 max 16384")?;
        writeln!(out, "uciok")
    }

    fn cmd_isready(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "readyok")
    }

    fn cmd_ucinewgame(&mut self) {
        self.pos = Position::startpos();
        self.searcher.clear_hash();
    }

    fn cmd_setoption(&mut self, args: &str) {
        // setoption name <id> [value <x>]
        let Some(rest) = args.strip_prefix("name ") else {
            return;
        };
        let (name, value) = match rest.split_once(" value ") {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (rest.trim(), ""),
        };
        if name.eq_ignore_ascii_case("hash") {
            match value.parse::<usize>() {
                Ok(mb) => {
                    if let Err(e) = self.searcher.set_tt_capacity_mb(mb) {
                        warn!("setoption Hash {mb}: {e}");
                    }
                }
                Err(_) => warn!("setoption Hash: bad value '{value}'"),
            }
        } else {
            debug!("ignoring option '{name}'");
        }
    }

    fn cmd_position(&mut self, args: &str) {
        // position startpos [moves ...] | position fen <fen> [moves ...]
        let (setup, moves) = match args.find("moves") {
            Some(i) => (args[..i].trim(), &args[i + "moves".len()..]),
            None => (args.trim(), ""),
        };
        let pos = if setup == "startpos" {
            Position::startpos()
        } else if let Some(fen) = setup.strip_prefix("fen ") {
            match Position::from_fen(fen.trim()) {
                Ok(p) => p,
                Err(e) => {
                    warn!("{e}");
                    return;
                }
            }
        } else {
            warn!("unknown position setup '{setup}'");
            return;
        };
        self.pos = pos;
        for text in moves.split_whitespace() {
            let Some(mv) = find_uci_move(&mut self.pos, text) else {
                warn!("illegal move '{text}' in position command");
                break;
            };
            let side = self.pos.side_to_move();
            self.pos.make(mv, side);
        }
    }

    fn cmd_go(&mut self, args: &str, out: &mut impl Write) -> io::Result<()> {
        let mut params = SearchParams { depth: DEFAULT_DEPTH, movetime_ms: None, ..self.params };
        let mut clock: [Option<u64>; 2] = [None; 2];
        let mut inc: [u64; 2] = [0; 2];
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            let mut num = || tokens.next().and_then(|s| s.parse::<u64>().ok());
            match tok {
                "depth" => {
                    if let Some(d) = num() {
                        params.depth = d as u32;
                    }
                }
                "movetime" => params.movetime_ms = num(),
                "nodes" => params.max_nodes = num(),
                "wtime" => clock[0] = num(),
                "btime" => clock[1] = num(),
                "winc" => inc[0] = num().unwrap_or(0),
                "binc" => inc[1] = num().unwrap_or(0),
                _ => {}
            }
        }

        let side = self.pos.side_to_move();
        if params.movetime_ms.is_none() {
            if let Some(left) = clock[side.index()] {
                // Spend a slice of the remaining clock plus half the increment.
                params.movetime_ms = Some((left / 30 + inc[side.index()] / 2).max(1));
                params.depth = self.params.depth;
            }
        }

        let res = self.searcher.search_with_params(&mut self.pos, params);
        let pv: Vec<String> = res.pv.iter().map(|m| m.to_uci()).collect();
        writeln!(
            out,
            "info depth {} seldepth {} score {} nodes {} hashfull {} pv {}",
            res.depth,
            res.seldepth,
            score_field(&res, side),
            res.nodes,
            self.searcher.tt().hashfull(),
            pv.join(" ")
        )?;
        match res.bestmove {
            Some(best) => writeln!(out, "bestmove {best}"),
            None => writeln!(out, "bestmove 0000"),
        }
    }

    /// Handles one command line. Returns `false` on `quit`.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        match cmd {
            "" => {}
            "uci" => self.cmd_uci(out)?,
            "isready" => self.cmd_isready(out)?,
            "ucinewgame" => self.cmd_ucinewgame(),
            "setoption" => self.cmd_setoption(rest.trim()),
            "position" => self.cmd_position(rest),
            "go" => self.cmd_go(rest, out)?,
            "stop" => {}
            "d" => writeln!(out, "{}\n{}", self.pos.pretty(), self.pos.to_fen())?,
            "quit" => return Ok(false),
            other => debug!("unknown command '{other}'"),
        }
        out.flush()?;
        Ok(true)
    }

    pub fn run_loop(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in stdin.lock().lines() {
            if !self.handle_line(&line?, &mut out)? {
                break;
            }
        }
        Ok(())
    }
}
