use serde::{Deserialize, Serialize};

/// Tempo in effect before the first tempo event (120 BPM).
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

/// How tempo events are applied when converting ticks to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TempoMode {
    /// Every tempo change is honored.
    #[default]
    TempoMap,
    /// The first tempo is applied to the whole file.
    ///
    /// Degraded mode: charts with tempo changes are silently mis-timed after the
    /// first change.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    tick: u64,
    micros_per_beat: u32,
    /// Absolute time of `tick`.
    seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Division {
    Metrical {
        ticks_per_beat: f64,
        segments: Vec<TempoSegment>,
    },
    Timecode {
        ticks_per_second: f64,
    },
}

/// Tick to seconds conversion for one MIDI file.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    division: Division,
}

impl TempoMap {
    /// Build a map for metrical (ticks per quarter note) timing.
    ///
    /// `changes` are `(tick, microseconds per quarter note)` pairs in any order.
    /// When several changes share a tick, the last one in `changes` wins.
    pub fn metrical(ticks_per_beat: u16, changes: &[(u64, u32)], mode: TempoMode) -> Self {
        debug_assert!(ticks_per_beat > 0, "ticks_per_beat must be positive");
        let ticks_per_beat = f64::from(ticks_per_beat.max(1));

        let mut sorted = changes.to_vec();
        sorted.sort_by_key(|&(tick, _)| tick);

        let segments = match mode {
            TempoMode::Fixed => {
                let micros = sorted
                    .first()
                    .map(|&(_, micros)| micros)
                    .unwrap_or(DEFAULT_MICROS_PER_BEAT);
                vec![TempoSegment {
                    tick: 0,
                    micros_per_beat: micros,
                    seconds: 0.0,
                }]
            }
            TempoMode::TempoMap => {
                let mut segments = vec![TempoSegment {
                    tick: 0,
                    micros_per_beat: DEFAULT_MICROS_PER_BEAT,
                    seconds: 0.0,
                }];
                for (tick, micros) in sorted {
                    let Some(last) = segments.last_mut() else {
                        continue;
                    };
                    if last.tick == tick {
                        last.micros_per_beat = micros;
                        continue;
                    }
                    let seconds = last.seconds + span_seconds(tick - last.tick, last, ticks_per_beat);
                    segments.push(TempoSegment {
                        tick,
                        micros_per_beat: micros,
                        seconds,
                    });
                }
                segments
            }
        };

        Self {
            division: Division::Metrical {
                ticks_per_beat,
                segments,
            },
        }
    }

    /// Build a map for SMPTE timecode timing. Tempo events do not apply.
    pub fn timecode(frames_per_second: f32, ticks_per_frame: u8) -> Self {
        debug_assert!(ticks_per_frame > 0, "ticks_per_frame must be positive");
        Self {
            division: Division::Timecode {
                ticks_per_second: f64::from(frames_per_second) * f64::from(ticks_per_frame.max(1)),
            },
        }
    }

    /// Absolute time in seconds of the given tick.
    pub fn seconds_at(&self, tick: u64) -> f64 {
        match &self.division {
            Division::Metrical {
                ticks_per_beat,
                segments,
            } => {
                let idx = segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
                let segment = &segments[idx];
                segment.seconds + span_seconds(tick - segment.tick, segment, *ticks_per_beat)
            }
            Division::Timecode { ticks_per_second } => tick as f64 / ticks_per_second,
        }
    }

    /// Number of constant-tempo segments (1 for timecode files).
    pub fn segment_count(&self) -> usize {
        match &self.division {
            Division::Metrical { segments, .. } => segments.len(),
            Division::Timecode { .. } => 1,
        }
    }
}

fn span_seconds(ticks: u64, segment: &TempoSegment, ticks_per_beat: f64) -> f64 {
    ticks as f64 / ticks_per_beat * f64::from(segment.micros_per_beat) / 1_000_000.0
}
