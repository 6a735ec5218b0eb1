use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::high_scores::score_key;

/// One playable difficulty of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub difficulty: String,
    pub chart_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongEntry {
    pub title: String,
    pub audio_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_path: Option<PathBuf>,
    pub charts: Vec<ChartEntry>,
}

/// A chosen song and difficulty with paths resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChart {
    pub title: String,
    pub difficulty: String,
    pub chart_path: PathBuf,
    pub audio_path: PathBuf,
    pub background_path: Option<PathBuf>,
}

impl ResolvedChart {
    /// Key under which this chart's high score is stored.
    pub fn score_key(&self) -> String {
        score_key(&self.title, &self.difficulty)
    }
}

/// Song list (songs.json).
#[derive(Debug, Clone)]
pub struct SongCatalog {
    songs: Vec<SongEntry>,
    base_dir: PathBuf,
}

impl SongCatalog {
    /// Build a catalog from entries. Relative paths resolve against `base_dir`.
    pub fn new(songs: Vec<SongEntry>, base_dir: impl Into<PathBuf>) -> Result<Self> {
        if songs.is_empty() {
            bail!("song catalog is empty");
        }
        Ok(Self {
            songs,
            base_dir: base_dir.into(),
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read song catalog {}", path.display()))?;
        let songs: Vec<SongEntry> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse song catalog {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let catalog = Self::new(songs, base_dir)
            .with_context(|| format!("no songs in {}", path.display()))?;
        debug!(
            "Loaded {} songs from {}",
            catalog.songs.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn songs(&self) -> &[SongEntry] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn resolve(&self, song: usize, chart: usize) -> Result<ResolvedChart> {
        let Some(entry) = self.songs.get(song) else {
            bail!(
                "song index {song} out of range ({} songs)",
                self.songs.len()
            );
        };
        let Some(chart_entry) = entry.charts.get(chart) else {
            bail!(
                "difficulty index {chart} out of range for '{}' ({} charts)",
                entry.title,
                entry.charts.len()
            );
        };

        Ok(ResolvedChart {
            title: entry.title.clone(),
            difficulty: chart_entry.difficulty.clone(),
            chart_path: self.base_dir.join(&chart_entry.chart_path),
            audio_path: self.base_dir.join(&entry.audio_path),
            background_path: entry.background_path.as_ref().map(|p| self.base_dir.join(p)),
        })
    }
}
