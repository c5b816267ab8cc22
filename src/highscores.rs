//! High score persistence
//!
//! The best score is a single integer stored as `{"high_score": N}`. The
//! simulation never touches storage; [`crate::App`] reads the value at
//! startup and writes it back when a finished run beats it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// On-disk record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u64,
}

/// Storage for the best score
pub trait HighScoreStore {
    /// Stored best score (0 if nothing has been stored yet)
    fn load(&self) -> Result<u64, PersistenceError>;

    fn save(&mut self, score: u64) -> Result<(), PersistenceError>;
}

/// JSON file store.
///
/// A missing file reads as 0. Writes go to a temporary sibling first and
/// are renamed over the target, so a crash never leaves a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self) -> Result<u64, PersistenceError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high score at {}, starting fresh", self.path.display());
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        let record: HighScoreRecord = serde_json::from_str(&json)?;
        log::info!("Loaded high score {}", record.high_score);
        Ok(record.high_score)
    }

    fn save(&mut self, score: u64) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score: score })?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::info!("High score {} saved to {}", score, self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and embedders without a filesystem
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    high_score: u64,
}

impl MemoryStore {
    pub fn new(high_score: u64) -> Self {
        Self { high_score }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, PersistenceError> {
        Ok(self.high_score)
    }

    fn save(&mut self, score: u64) -> Result<(), PersistenceError> {
        self.high_score = score;
        Ok(())
    }
}
