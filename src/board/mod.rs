pub mod attacks;
pub mod fen;
mod magics;
pub mod movegen;
pub mod moves;
pub mod position;
pub mod types;

pub use fen::START_FEN;
pub use movegen::{execute, generate, generate_captures, legal_moves, GenMode};
pub use moves::{Move, MoveList, MAX_MOVES};
pub use position::{Position, Snapshot, Undo};
pub use types::{Bitboard, Color, PieceKind, Square};
