use thiserror::Error;

/// Errors surfaced by the engine library. Binaries wrap these in `anyhow`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid move '{0}'")]
    InvalidMove(String),

    #[error("failed to allocate a {mb} MB transposition table")]
    TableAlloc { mb: usize },

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn fen(fen: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidFen { fen: fen.to_string(), reason: reason.into() }
    }
}
