use std::collections::VecDeque;

use notefall_chart::Chart;
use notefall_play::InputEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerOptions {
    /// Maximum timing error in seconds, applied uniformly in both directions
    pub jitter: f64,
    /// Leave every n-th note unpressed
    pub skip_every: Option<usize>,
    pub seed: u64,
}

/// Stand-in for a human player: one press per note, with optional error and gaps.
///
/// Presses are queued up front in arrival order and handed out as the judgment
/// clock passes them.
pub struct ScriptedPlayer {
    queue: VecDeque<InputEvent>,
    skipped: usize,
}

impl ScriptedPlayer {
    pub fn new(chart: &Chart, options: PlayerOptions) -> Self {
        let mut rng = StdRng::seed_from_u64(options.seed);
        let jitter = options.jitter.abs();

        let mut presses = Vec::with_capacity(chart.len());
        let mut skipped = 0;
        for (i, note) in chart.notes().iter().enumerate() {
            if options.skip_every.is_some_and(|n| n > 0 && (i + 1) % n == 0) {
                skipped += 1;
                continue;
            }
            let error = if jitter > 0.0 {
                rng.gen_range(-jitter..=jitter)
            } else {
                0.0
            };
            presses.push(InputEvent::new(note.lane, note.timestamp + error));
        }
        presses.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self {
            queue: presses.into(),
            skipped,
        }
    }

    /// Take every press due at or before `clock`, in arrival order.
    pub fn presses_until(&mut self, clock: f64, out: &mut Vec<InputEvent>) {
        while let Some(press) = self.queue.front() {
            if press.time > clock {
                break;
            }
            out.extend(self.queue.pop_front());
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
