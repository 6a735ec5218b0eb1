// Chart model and Standard MIDI File chart loading: notes, tempo map, load errors

mod chart;
mod error;
mod loader;
mod tempo;

pub use chart::{Chart, ChartInfo, LANE_COUNT, Note};
pub use error::ChartLoadError;
pub use loader::{ChartLoader, LoadOptions};
pub use tempo::{DEFAULT_MICROS_PER_BEAT, TempoMap, TempoMode};
