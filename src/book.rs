//! Opening book: a move trie stored in one arena, keyed by UCI move text.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::moves::parse_uci;
use crate::error::Result;

/// One line of a JSON-lines book file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookLine {
    pub name: Option<String>,
    pub moves: Vec<String>,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookNode {
    pub uci: String,
    /// `from * 64 + to`.
    pub code: u16,
    pub name: Option<String>,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    first_child: Option<usize>,
    next_sibling: Option<usize>,
}

impl BookNode {
    fn new(uci: &str, code: u16) -> Self {
        Self {
            uci: uci.to_string(),
            code,
            name: None,
            white_wins: 0,
            black_wins: 0,
            draws: 0,
            first_child: None,
            next_sibling: None,
        }
    }
}

const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub struct OpeningBook {
    nodes: Vec<BookNode>,
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self { nodes: vec![BookNode::new("root", 0)] }
    }
}

impl OpeningBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book preloaded with a handful of main lines.
    pub fn builtin() -> Self {
        let mut book = Self::new();
        for &(name, moves) in BUILTIN_LINES {
            let moves: Vec<&str> = moves.split_whitespace().collect();
            book.add_line(&moves, Some(name), 0, 0, 0);
        }
        book
    }

    /// Number of move nodes, the root excluded.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, idx: usize) -> &BookNode {
        &self.nodes[idx]
    }

    fn children(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let mut next = self.nodes[idx].first_child;
        std::iter::from_fn(move || {
            let cur = next?;
            next = self.nodes[cur].next_sibling;
            Some(cur)
        })
    }

    fn child(&self, idx: usize, uci: &str) -> Option<usize> {
        self.children(idx).find(|&c| self.nodes[c].uci == uci)
    }

    /// Inserts a line, sharing its prefix with existing lines. The name and
    /// results attach to the final node. Returns false, leaving the book
    /// unchanged, when a move is not valid UCI text.
    pub fn add_line<S: AsRef<str>>(
        &mut self,
        moves: &[S],
        name: Option<&str>,
        white_wins: u32,
        black_wins: u32,
        draws: u32,
    ) -> bool {
        let mut codes = Vec::with_capacity(moves.len());
        for m in moves {
            match parse_uci(m.as_ref()) {
                Some((from, to, _)) => codes.push(from as u16 * 64 + to as u16),
                None => return false,
            }
        }

        let mut cur = ROOT;
        for (m, code) in moves.iter().zip(codes) {
            let m = m.as_ref();
            cur = match self.child(cur, m) {
                Some(c) => c,
                None => {
                    let idx = self.nodes.len();
                    let last = self.children(cur).last();
                    self.nodes.push(BookNode::new(m, code));
                    match last {
                        Some(last) => self.nodes[last].next_sibling = Some(idx),
                        None => self.nodes[cur].first_child = Some(idx),
                    }
                    idx
                }
            };
        }

        let node = &mut self.nodes[cur];
        if node.name.is_none() {
            node.name = name.map(str::to_string);
        }
        node.white_wins += white_wins;
        node.black_wins += black_wins;
        node.draws += draws;
        true
    }

    /// Reads JSON lines of [`BookLine`]. Malformed lines are skipped with a
    /// warning. Returns the number of lines added.
    pub fn load_json<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = File::open(path.as_ref())?;
        let added = self.load_reader(file)?;
        info!("book: loaded {} lines from {}", added, path.as_ref().display());
        Ok(added)
    }

    pub fn load_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut added = 0;
        for (no, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<BookLine>(text) {
                Ok(entry) => {
                    if self.add_line(&entry.moves, entry.name.as_deref(), entry.white_wins, entry.black_wins, entry.draws) {
                        added += 1;
                    } else {
                        warn!("book: line {}: bad move text", no + 1);
                    }
                }
                Err(e) => warn!("book: line {}: {}", no + 1, e),
            }
        }
        Ok(added)
    }

    fn walk<S: AsRef<str>>(&self, history: &[S]) -> Option<usize> {
        history.iter().try_fold(ROOT, |cur, m| self.child(cur, m.as_ref()))
    }

    /// Uniformly random continuation of `history`, or `None` when the game
    /// has left the book or the line ends.
    pub fn get_book_move<S: AsRef<str>, R: Rng + ?Sized>(&self, history: &[S], rng: &mut R) -> Option<&BookNode> {
        let at = self.walk(history)?;
        let replies: Vec<usize> = self.children(at).collect();
        if replies.is_empty() {
            return None;
        }
        Some(&self.nodes[replies[rng.gen_range(0..replies.len())]])
    }

    /// Plies of `history` found in the book and the deepest opening name
    /// along them.
    pub fn line_info<S: AsRef<str>>(&self, history: &[S]) -> (usize, Option<&str>) {
        let mut cur = ROOT;
        let mut matched = 0;
        let mut name = None;
        for m in history {
            let Some(c) = self.child(cur, m.as_ref()) else {
                break;
            };
            cur = c;
            matched += 1;
            if let Some(n) = self.nodes[c].name.as_deref() {
                name = Some(n);
            }
        }
        (matched, name)
    }
}

const BUILTIN_LINES: &[(&str, &str)] = &[
    ("Italian Game", "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 e1g1 g8f6"),
    ("Ruy Lopez", "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6"),
    ("Scotch Game", "e2e4 e7e5 g1f3 b8c6 d2d4 e5d4 f3d4 f8c5"),
    ("Vienna Game", "e2e4 e7e5 b1c3 g8f6 f2f4 d7d5 f4e5 f6e4"),
    ("King's Gambit", "e2e4 e7e5 f2f4 e5f4 g1f3 g7g5 h2h4 g5g4"),
    ("Sicilian Defense, Dragon", "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 g7g6"),
    ("French Defense", "e2e4 e7e6 d2d4 d7d5 b1c3 f8b4 e4e5 c7c5"),
    ("Caro-Kann Defense", "e2e4 c7c6 d2d4 d7d5 b1c3 d5e4 c3e4 c8f5"),
    ("Scandinavian Defense", "e2e4 d7d5 e4d5 d8d5 b1c3 d5a5 d2d4 g8f6"),
    ("Pirc Defense", "e2e4 d7d6 d2d4 g8f6 b1c3 g7g6 f2f4 f8g7"),
    ("Alekhine's Defense", "e2e4 g8f6 e4e5 f6d5 d2d4 d7d6 g1f3 c8g4"),
    ("Queen's Gambit Declined", "d2d4 d7d5 c2c4 e7e6 b1c3 g8f6 c1g5 f8e7"),
    ("King's Indian Defense", "d2d4 g8f6 c2c4 g7g6 b1c3 f8g7 e2e4 d7d6"),
    ("Nimzo-Indian Defense", "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4 e2e3 e8g8"),
    ("Queen's Indian Defense", "d2d4 g8f6 c2c4 e7e6 g1f3 b7b6 g2g3 c8b7"),
    ("Catalan Opening", "d2d4 g8f6 c2c4 e7e6 g2g3 d7d5 f1g2 f8e7"),
    ("Dutch Defense", "d2d4 f7f5 g2g3 g8f6 f1g2 e7e6 g1f3 f8e7"),
    ("London System", "d2d4 d7d5 g1f3 g8f6 c1f4 c7c5 e2e3 b8c6"),
    ("English Opening", "c2c4 e7e5 b1c3 g8f6 g2g3 d7d5 c4d5 f6d5"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lines_share_prefixes() {
        let book = OpeningBook::builtin();
        // Every line begins with one of three first moves.
        let firsts: Vec<&str> = book.children(ROOT).map(|c| book.node(c).uci.as_str()).collect();
        assert_eq!(firsts, vec!["e2e4", "d2d4", "c2c4"]);
        let (plies, name) = book.line_info(&["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6"]);
        assert_eq!(plies, 8);
        assert_eq!(name, Some("Ruy Lopez"));
    }
}
