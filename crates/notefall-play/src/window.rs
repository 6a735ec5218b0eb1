use std::collections::VecDeque;
use std::sync::Arc;

use log::trace;
use notefall_chart::Chart;

use crate::rule::PlayRule;

/// A chart note inside the live window.
///
/// `judged` goes from false to true exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveNote {
    index: usize,
    judged: bool,
}

impl ActiveNote {
    /// Index of the note in the chart.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_judged(&self) -> bool {
        self.judged
    }

    /// Returns false if the note was already judged.
    pub(crate) fn mark_judged(&mut self) -> bool {
        if self.judged {
            return false;
        }
        self.judged = true;
        true
    }
}

/// Read-only view of an active note for renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveNoteView {
    pub index: usize,
    pub lane: usize,
    pub timestamp: f64,
    pub judged: bool,
}

/// What one call to [`ActiveWindow::advance`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    pub admitted: usize,
    /// Chart indices of notes that timed out this call, in chart order
    pub timed_out: Vec<usize>,
    pub evicted: usize,
}

impl AdvanceReport {
    pub fn is_empty(&self) -> bool {
        self.admitted == 0 && self.timed_out.is_empty() && self.evicted == 0
    }
}

/// The set of chart notes currently eligible for judgment or still on screen.
///
/// Notes enter through a cursor that only moves forward, so each note is admitted
/// once and in chart order. The active set therefore stays sorted by timestamp.
#[derive(Debug, Clone)]
pub struct ActiveWindow {
    pub(crate) chart: Arc<Chart>,
    cursor: usize,
    pub(crate) active: VecDeque<ActiveNote>,
}

impl ActiveWindow {
    pub fn new(chart: Arc<Chart>) -> Self {
        Self {
            chart,
            cursor: 0,
            active: VecDeque::new(),
        }
    }

    pub fn chart(&self) -> &Arc<Chart> {
        &self.chart
    }

    /// Index of the next chart note to admit.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Every chart note has been admitted and the window has drained.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chart.len() && self.active.is_empty()
    }

    /// Admit upcoming notes, time out stale ones, and evict old judged ones.
    pub fn advance(&mut self, clock: f64, speed: f64, rule: &PlayRule) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        let notes = self.chart.notes();

        let look_ahead = rule.look_ahead(speed);
        while let Some(note) = notes.get(self.cursor) {
            if note.timestamp - clock > look_ahead {
                break;
            }
            self.active.push_back(ActiveNote {
                index: self.cursor,
                judged: false,
            });
            self.cursor += 1;
            report.admitted += 1;
        }

        let miss_window = rule.miss_window();
        for active in self.active.iter_mut() {
            let late_by = clock - notes[active.index].timestamp;
            if late_by <= miss_window {
                // Sorted: nothing after this can be late either
                break;
            }
            if active.mark_judged() {
                report.timed_out.push(active.index);
            }
        }

        let before = self.active.len();
        self.active
            .retain(|a| !(a.judged && clock - notes[a.index].timestamp > rule.eviction_grace));
        report.evicted = before - self.active.len();

        if !report.is_empty() {
            trace!(
                "window @{clock:.3}: +{} admitted, {} timed out, {} evicted, {} active",
                report.admitted,
                report.timed_out.len(),
                report.evicted,
                self.active.len()
            );
        }
        report
    }

    pub fn iter(&self) -> impl Iterator<Item = ActiveNoteView> + '_ {
        let notes = self.chart.notes();
        self.active.iter().map(move |a| {
            let note = &notes[a.index];
            ActiveNoteView {
                index: a.index,
                lane: note.lane,
                timestamp: note.timestamp,
                judged: a.judged,
            }
        })
    }

    /// Rewind to the start of the same chart.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.active.clear();
    }

    /// Rewind and switch to `chart`.
    pub fn replace_chart(&mut self, chart: Arc<Chart>) {
        self.chart = chart;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notefall_chart::Note;

    fn window(times: &[(usize, f64)]) -> ActiveWindow {
        let notes = times.iter().map(|&(lane, t)| Note::new(lane, t)).collect();
        ActiveWindow::new(Arc::new(Chart::from_notes(notes).unwrap()))
    }

    #[test]
    fn test_admission_uses_look_ahead() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0), (1, 3.0), (2, 10.0)]);

        // look-ahead at speed 1.0 is 2.8s
        let report = window.advance(0.0, 1.0, &rule);
        assert_eq!(report.admitted, 1);
        assert_eq!(window.cursor(), 1);

        let report = window.advance(0.2, 1.0, &rule);
        assert_eq!(report.admitted, 1);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_admission_faster_speed_shrinks_horizon() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0), (1, 2.0)]);

        // look-ahead at speed 2.0 is 1.4s
        window.advance(0.0, 2.0, &rule);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_cursor_never_moves_back() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0), (1, 2.0)]);

        window.advance(0.0, 1.0, &rule);
        assert_eq!(window.cursor(), 2);

        // Clock adjusted backwards: nothing is re-admitted
        let report = window.advance(-5.0, 1.0, &rule);
        assert_eq!(report.admitted, 0);
        assert_eq!(window.cursor(), 2);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_timeout_reported_once() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0), (1, 1.1)]);

        window.advance(0.0, 1.0, &rule);
        let report = window.advance(1.16, 1.0, &rule);
        assert_eq!(report.timed_out, vec![0]);

        let report = window.advance(1.3, 1.0, &rule);
        assert_eq!(report.timed_out, vec![1]);

        let report = window.advance(1.5, 1.0, &rule);
        assert!(report.timed_out.is_empty());
    }

    #[test]
    fn test_not_timed_out_at_window_edge() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0)]);

        window.advance(0.0, 1.0, &rule);
        let report = window.advance(1.1, 1.0, &rule);
        assert!(report.timed_out.is_empty());
        assert!(!window.iter().next().unwrap().judged);
    }

    #[test]
    fn test_eviction_after_grace() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0)]);

        window.advance(0.0, 1.0, &rule);
        window.advance(1.5, 1.0, &rule);
        assert_eq!(window.len(), 1);
        assert!(!window.is_exhausted());

        let report = window.advance(2.01, 1.0, &rule);
        assert_eq!(report.evicted, 1);
        assert!(window.is_exhausted());
    }

    #[test]
    fn test_reset_rewinds() {
        let rule = PlayRule::default();
        let mut window = window(&[(0, 1.0), (1, 2.0)]);

        window.advance(3.0, 1.0, &rule);
        window.reset();
        assert_eq!(window.cursor(), 0);
        assert!(window.is_empty());
        assert_eq!(window.chart().len(), 2);
    }

    #[test]
    fn test_iter_views() {
        let rule = PlayRule::default();
        let mut window = window(&[(4, 0.5), (2, 1.0)]);

        window.advance(0.0, 1.0, &rule);
        let views: Vec<ActiveNoteView> = window.iter().collect();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].lane, 4);
        assert_eq!(views[1].index, 1);
        assert!(views.iter().all(|v| !v.judged));
    }
}
