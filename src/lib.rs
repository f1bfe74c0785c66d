//! Bitboard chess engine: position and move generation on magic bitboards,
//! an iterative-deepening alpha-beta search with a bucketed transposition
//! table and static exchange evaluation, and thin book, UCI and perft
//! front ends.

pub mod board;
pub mod book;
pub mod config;
pub mod error;
pub mod perft;
pub mod search;
pub mod uci;

pub use board::{execute, Color, Move, PieceKind, Position, Square, START_FEN};
pub use error::{EngineError, Result};
pub use search::{SearchParams, SearchResult, Searcher};
