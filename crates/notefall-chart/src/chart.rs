use serde::{Deserialize, Serialize};

use crate::error::ChartLoadError;
use crate::tempo::TempoMode;

/// Number of parallel input lanes.
pub const LANE_COUNT: usize = 6;

/// A single timed note. Notes have no duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Lane index in `[0, LANE_COUNT)`
    pub lane: usize,
    /// Time in seconds at which the note reaches the judgment line
    pub timestamp: f64,
}

impl Note {
    pub fn new(lane: usize, timestamp: f64) -> Self {
        Self { lane, timestamp }
    }

    /// Map a MIDI key number onto a lane (`key mod LANE_COUNT`).
    pub fn from_key(key: u8, timestamp: f64) -> Self {
        Self::new(usize::from(key) % LANE_COUNT, timestamp)
    }

    fn is_valid(&self) -> bool {
        self.lane < LANE_COUNT && self.timestamp.is_finite() && self.timestamp >= 0.0
    }
}

/// Information about how a chart was produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartInfo {
    pub tempo_mode: TempoMode,
    /// Tempo events found in the source (0 for hand-built charts)
    pub tempo_changes: usize,
    /// Timestamp of the last note in seconds
    pub duration: f64,
}

/// An immutable, time-ordered list of notes.
///
/// Never empty: every constructor rejects a chart without notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    notes: Vec<Note>,
    info: ChartInfo,
}

impl Chart {
    /// Build a chart from notes in any order.
    ///
    /// Notes are stable-sorted by timestamp, so ties keep their given order.
    pub fn from_notes(notes: Vec<Note>) -> Result<Self, ChartLoadError> {
        Self::assemble(notes, ChartInfo::default())
    }

    pub(crate) fn assemble(mut notes: Vec<Note>, mut info: ChartInfo) -> Result<Self, ChartLoadError> {
        if notes.is_empty() {
            return Err(ChartLoadError::Empty);
        }
        if let Some((index, note)) = notes.iter().enumerate().find(|(_, n)| !n.is_valid()) {
            return Err(ChartLoadError::InvalidNote {
                index,
                lane: note.lane,
                timestamp: note.timestamp,
            });
        }

        // sort_by is stable
        notes.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        info.duration = notes.last().map_or(0.0, |n| n.timestamp);

        Ok(Self { notes, info })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn info(&self) -> &ChartInfo {
        &self.info
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Always false for a constructed chart; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Number of notes per lane.
    pub fn lane_counts(&self) -> [usize; LANE_COUNT] {
        let mut counts = [0; LANE_COUNT];
        for note in &self.notes {
            counts[note.lane] += 1;
        }
        counts
    }
}
