use std::path::PathBuf;
use thiserror::Error;

/// Reasons a chart cannot be produced. Any of these is fatal to starting a session.
#[derive(Debug, Error)]
pub enum ChartLoadError {
    #[error("Failed to read chart file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse MIDI data: {0}")]
    Malformed(#[from] midly::Error),

    #[error("MIDI header declares a zero time division")]
    ZeroTimeDivision,

    #[error("Chart contains no note-on events")]
    Empty,

    #[error("Invalid note at index {index}: lane {lane}, timestamp {timestamp}")]
    InvalidNote {
        index: usize,
        lane: usize,
        timestamp: f64,
    },
}
