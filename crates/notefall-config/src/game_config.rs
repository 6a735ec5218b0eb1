use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Player settings (config.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub note_speed_multiplier: f64,
    pub bgm_volume: f64,
    pub sfx_volume: f64,
    /// Output latency compensation in milliseconds
    pub audio_offset: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            note_speed_multiplier: 1.0,
            bgm_volume: 100.0,
            sfx_volume: 100.0,
            audio_offset: 0.0,
        }
    }
}

impl GameConfig {
    pub const MIN_SPEED: f64 = 0.1;
    pub const MAX_SPEED: f64 = 10.0;
    const MAX_OFFSET_MS: f64 = 1000.0;

    pub fn validate(&mut self) {
        if !self.note_speed_multiplier.is_finite() {
            self.note_speed_multiplier = 1.0;
        }
        self.note_speed_multiplier = self
            .note_speed_multiplier
            .clamp(Self::MIN_SPEED, Self::MAX_SPEED);
        self.bgm_volume = clamp_volume(self.bgm_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume);
        if !self.audio_offset.is_finite() {
            self.audio_offset = 0.0;
        }
        self.audio_offset = self
            .audio_offset
            .clamp(-Self::MAX_OFFSET_MS, Self::MAX_OFFSET_MS);
    }

    /// Calibration offset for the judgment clock, in seconds.
    pub fn calibration_offset(&self) -> f64 {
        self.audio_offset / 1000.0
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: GameConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Read config, falling back to defaults when the file is missing or broken.
    pub fn read_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => {
                debug!("Loaded config from {}: {:?}", path.display(), config);
                config
            }
            Err(e) => {
                warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_finite() {
        volume.clamp(0.0, 100.0)
    } else {
        100.0
    }
}
