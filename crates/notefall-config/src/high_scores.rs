use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

/// Storage key for a song and difficulty.
pub fn score_key(title: &str, difficulty: &str) -> String {
    format!("{title}-{difficulty}")
}

/// Best scores per chart (scores.json).
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
    scores: BTreeMap<String, u32>,
    /// The file exists but could not be read back; saving would destroy it
    unreadable: bool,
}

impl HighScoreStore {
    /// Open the store at `path`. A missing file reads as empty. A file that
    /// exists but cannot be read or parsed also reads as empty, and the store
    /// refuses to save over it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut unreadable = false;
        let scores = match std::fs::read_to_string(&path) {
            Ok(data) if data.trim().is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                warn!("Ignoring unparsable high scores {}: {e}", path.display());
                unreadable = true;
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No high scores at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Cannot read high scores {}: {e}", path.display());
                unreadable = true;
                BTreeMap::new()
            }
        };
        Self {
            path,
            scores,
            unreadable,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.scores.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// True when the file on disk could not be loaded and will not be saved over.
    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }

    /// Record `score` if it beats the stored best. Returns true on a new best.
    pub fn submit(&mut self, key: &str, score: u32) -> bool {
        match self.scores.get(key) {
            Some(&best) if best >= score => false,
            _ => {
                info!("New high score for {key}: {score}");
                self.scores.insert(key.to_string(), score);
                true
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        if self.unreadable {
            bail!(
                "refusing to overwrite unreadable high scores {}",
                self.path.display()
            );
        }
        let json = serde_json::to_string_pretty(&self.scores)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
