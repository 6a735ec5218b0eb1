// Persisted surroundings: game config, song catalog, high scores

pub mod game_config;
pub mod high_scores;
pub mod song_catalog;

pub use game_config::GameConfig;
pub use high_scores::{HighScoreStore, score_key};
pub use song_catalog::{ChartEntry, ResolvedChart, SongCatalog, SongEntry};
