//! Engine configuration, read from JSON. Every field has a default so a
//! config file only needs the keys it overrides.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::search::SearchParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Transposition table size in MiB.
    pub hash_mb: usize,
    pub search: SearchParams,
    /// JSON-lines opening book; the built-in lines are used when unset.
    pub book: Option<PathBuf>,
    /// Thinking time per engine move in the interactive game.
    pub move_time_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { hash_mb: 64, search: SearchParams::default(), book: None, move_time_secs: 2.0 }
    }
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn move_time(&self) -> Duration {
        Duration::try_from_secs_f64(self.move_time_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}
