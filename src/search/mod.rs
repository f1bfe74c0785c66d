pub mod alphabeta;
pub mod eval;
pub mod ordering;
pub mod see;
pub mod tt;

pub use alphabeta::{SearchParams, SearchResult, Searcher};
pub use tt::{Bound, Tt, MATE, MATE_BOUND, MAX_PLY};
