use notefall_chart::LANE_COUNT;
use serde::{Deserialize, Serialize};

use crate::progress::Progress;
use crate::rule::PlayRule;
use crate::window::ActiveWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgmentOutcome {
    Perfect,
    Great,
    Miss,
    /// The input matched no judgable note. Never recorded into progress.
    None,
}

impl JudgmentOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Perfect | Self::Great)
    }

    pub fn is_combo_break(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// Timing direction for FAST/SLOW display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDirection {
    Fast,
    Exact,
    Slow,
}

impl TimingDirection {
    const EXACT_THRESHOLD: f64 = 0.001;

    /// `offset` is input time minus note time; negative means early.
    pub fn from_offset(offset: f64) -> Self {
        if offset < -Self::EXACT_THRESHOLD {
            TimingDirection::Fast
        } else if offset > Self::EXACT_THRESHOLD {
            TimingDirection::Slow
        } else {
            TimingDirection::Exact
        }
    }
}

/// One recorded outcome against one chart note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentEvent {
    pub note_index: usize,
    pub lane: usize,
    pub outcome: JudgmentOutcome,
    /// Judgment time minus note time in seconds (the clock time for timeouts)
    pub offset: f64,
}

impl JudgmentEvent {
    pub fn direction(&self) -> TimingDirection {
        TimingDirection::from_offset(self.offset)
    }
}

/// Matches key presses against the active window.
#[derive(Debug, Clone, Copy, Default)]
pub struct JudgeEngine {
    rule: PlayRule,
}

impl JudgeEngine {
    pub fn new(rule: PlayRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &PlayRule {
        &self.rule
    }

    /// Tier for an absolute time difference, or `None` when outside both windows.
    pub fn classify(&self, diff: f64) -> Option<JudgmentOutcome> {
        let diff = diff.abs();
        if diff < self.rule.perfect_window {
            Some(JudgmentOutcome::Perfect)
        } else if diff < self.rule.great_window {
            Some(JudgmentOutcome::Great)
        } else {
            None
        }
    }

    /// Judge one key press.
    ///
    /// Unjudged notes in `lane` are tried in chart order, and the first one inside
    /// a tolerance is consumed. A press that fits no note is discarded without
    /// penalty and returns `None`.
    pub fn judge(
        &self,
        window: &mut ActiveWindow,
        progress: &mut Progress,
        lane: usize,
        time: f64,
    ) -> Option<JudgmentEvent> {
        debug_assert!(lane < LANE_COUNT, "lane out of range: {lane}");
        if lane >= LANE_COUNT {
            return None;
        }

        let notes = window.chart.notes();
        for active in window.active.iter_mut() {
            let note = &notes[active.index()];
            if note.lane != lane || active.is_judged() {
                continue;
            }

            let offset = time - note.timestamp;
            let Some(outcome) = self.classify(offset) else {
                continue;
            };

            if !active.mark_judged() {
                continue;
            }
            let event = JudgmentEvent {
                note_index: active.index(),
                lane,
                outcome,
                offset,
            };
            progress.apply_event(&event);
            return Some(event);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use notefall_chart::{Chart, Note};

    use super::*;

    fn setup(notes: &[(usize, f64)]) -> (ActiveWindow, Progress, JudgeEngine) {
        let rule = PlayRule::default();
        let notes = notes.iter().map(|&(lane, t)| Note::new(lane, t)).collect();
        let mut window = ActiveWindow::new(Arc::new(Chart::from_notes(notes).unwrap()));
        window.advance(0.0, 0.1, &rule);
        (window, Progress::new(rule, 100), JudgeEngine::new(rule))
    }

    #[test]
    fn test_classify_windows() {
        let engine = JudgeEngine::default();

        assert_eq!(engine.classify(0.0), Some(JudgmentOutcome::Perfect));
        assert_eq!(engine.classify(0.079), Some(JudgmentOutcome::Perfect));
        assert_eq!(engine.classify(-0.079), Some(JudgmentOutcome::Perfect));
        assert_eq!(engine.classify(0.08), Some(JudgmentOutcome::Great));
        assert_eq!(engine.classify(-0.149), Some(JudgmentOutcome::Great));
        assert_eq!(engine.classify(0.15), None);
        assert_eq!(engine.classify(1.0), None);
    }

    #[test]
    fn test_timing_direction() {
        assert_eq!(TimingDirection::from_offset(-0.05), TimingDirection::Fast);
        assert_eq!(TimingDirection::from_offset(0.05), TimingDirection::Slow);
        assert_eq!(TimingDirection::from_offset(0.0005), TimingDirection::Exact);
    }

    #[test]
    fn test_wrong_lane_is_none() {
        let (mut window, mut progress, engine) = setup(&[(2, 5.0)]);

        assert!(engine.judge(&mut window, &mut progress, 3, 5.0).is_none());
        assert_eq!(progress.snapshot().score, 0);
    }

    #[test]
    fn test_out_of_tolerance_press_skips_to_later_note() {
        let (mut window, mut progress, engine) = setup(&[(1, 1.0), (1, 1.5)]);

        // Too late for the first note, perfect for the second
        let event = engine.judge(&mut window, &mut progress, 1, 1.52).unwrap();
        assert_eq!(event.note_index, 1);
        assert_eq!(event.outcome, JudgmentOutcome::Perfect);

        let views: Vec<bool> = window.iter().map(|v| v.judged).collect();
        assert_eq!(views, vec![false, true]);
    }

    #[test]
    fn test_great_records_slow() {
        let (mut window, mut progress, engine) = setup(&[(0, 1.0)]);

        let event = engine.judge(&mut window, &mut progress, 0, 1.1).unwrap();
        assert_eq!(event.outcome, JudgmentOutcome::Great);
        assert_eq!(event.direction(), TimingDirection::Slow);

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.great_count, 1);
        assert_eq!(snapshot.slow_count, 1);
        assert_eq!(snapshot.score, 50);
    }
}
