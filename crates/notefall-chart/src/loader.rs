use std::path::Path;

use log::{debug, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::chart::{Chart, ChartInfo, Note};
use crate::error::ChartLoadError;
use crate::tempo::{TempoMap, TempoMode};

/// Options for [`ChartLoader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub tempo_mode: TempoMode,
}

/// Builds charts from Standard MIDI Files.
///
/// Only note-on events are read. Each becomes one note in lane `key mod LANE_COUNT`.
/// Note-offs (including note-on with velocity 0) are ignored.
pub struct ChartLoader;

/// Note-on event before tick conversion.
struct RawNote {
    tick: u64,
    key: u8,
}

impl ChartLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Chart, ChartLoadError> {
        Self::load_with(path, LoadOptions::default())
    }

    pub fn load_with<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Chart, ChartLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ChartLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let chart = Self::load_bytes_with(&bytes, options)?;
        debug!(
            "Loaded chart {}: {} notes, {} tempo events, {:.3}s",
            path.display(),
            chart.len(),
            chart.info().tempo_changes,
            chart.info().duration
        );
        Ok(chart)
    }

    pub fn load_bytes(bytes: &[u8]) -> Result<Chart, ChartLoadError> {
        Self::load_bytes_with(bytes, LoadOptions::default())
    }

    pub fn load_bytes_with(bytes: &[u8], options: LoadOptions) -> Result<Chart, ChartLoadError> {
        let smf = Smf::parse(bytes)?;

        // Tracks are merged: tempo events from any track shape one map.
        let mut tempo_changes: Vec<(u64, u32)> = Vec::new();
        let mut raw_notes: Vec<RawNote> = Vec::new();

        for track in &smf.tracks {
            let mut tick: u64 = 0;
            for event in track {
                tick += u64::from(event.delta.as_int());
                match &event.kind {
                    TrackEventKind::Meta(MetaMessage::Tempo(micros)) => {
                        tempo_changes.push((tick, micros.as_int()));
                    }
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { key, vel },
                        ..
                    } if vel.as_int() > 0 => {
                        raw_notes.push(RawNote {
                            tick,
                            key: key.as_int(),
                        });
                    }
                    _ => {}
                }
            }
        }

        if raw_notes.is_empty() {
            return Err(ChartLoadError::Empty);
        }

        let tempo = match smf.header.timing {
            Timing::Metrical(ticks_per_beat) => {
                let ticks_per_beat = ticks_per_beat.as_int();
                if ticks_per_beat == 0 {
                    return Err(ChartLoadError::ZeroTimeDivision);
                }
                if options.tempo_mode == TempoMode::Fixed && has_tempo_change(&tempo_changes) {
                    warn!(
                        "Fixed-tempo loading ignores {} tempo events; note times after the first change will be wrong",
                        tempo_changes.len() - 1
                    );
                }
                TempoMap::metrical(ticks_per_beat, &tempo_changes, options.tempo_mode)
            }
            Timing::Timecode(fps, ticks_per_frame) => {
                if ticks_per_frame == 0 {
                    return Err(ChartLoadError::ZeroTimeDivision);
                }
                TempoMap::timecode(fps.as_f32(), ticks_per_frame)
            }
        };

        let notes = raw_notes
            .iter()
            .map(|raw| Note::from_key(raw.key, tempo.seconds_at(raw.tick)))
            .collect();

        Chart::assemble(
            notes,
            ChartInfo {
                tempo_mode: options.tempo_mode,
                tempo_changes: tempo_changes.len(),
                duration: 0.0,
            },
        )
    }
}

fn has_tempo_change(changes: &[(u64, u32)]) -> bool {
    match changes.first() {
        Some(&(_, first)) => changes.iter().any(|&(_, micros)| micros != first),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_tempo_change() {
        assert!(!has_tempo_change(&[]));
        assert!(!has_tempo_change(&[(0, 500_000), (960, 500_000)]));
        assert!(has_tempo_change(&[(0, 500_000), (960, 400_000)]));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = ChartLoader::load_bytes(b"not a midi file");
        assert!(matches!(result, Err(ChartLoadError::Malformed(_))));
    }
}
