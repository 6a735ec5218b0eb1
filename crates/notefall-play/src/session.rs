use std::sync::Arc;

use log::info;
use notefall_chart::Chart;
use serde::{Deserialize, Serialize};

use crate::clock::{InputEvent, PlaybackClock, judgment_clock};
use crate::judge::{JudgeEngine, JudgmentEvent, JudgmentOutcome};
use crate::progress::{Progress, ProgressSnapshot};
use crate::rule::PlayRule;
use crate::window::{ActiveNoteView, ActiveWindow};

/// How a session ended, or `None` while it is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalState {
    #[default]
    None,
    Failed,
    Completed,
}

impl TerminalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    Finished(TerminalState),
    Stopped,
}

/// Everything one tick needs from the surrounding flow.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    /// Raw audio playback position in seconds
    pub playback_position: f64,
    /// Output latency compensation in seconds
    pub calibration_offset: f64,
    pub speed: f64,
    pub playback_finished: bool,
    /// Key presses queued since the last tick, in arrival order
    pub inputs: &'a [InputEvent],
}

impl<'a> TickInput<'a> {
    pub fn new(playback_position: f64, calibration_offset: f64, speed: f64) -> Self {
        Self {
            playback_position,
            calibration_offset,
            speed,
            playback_finished: false,
            inputs: &[],
        }
    }

    /// Read position and end-of-audio from a playback clock.
    pub fn from_clock(clock: &impl PlaybackClock, calibration_offset: f64, speed: f64) -> Self {
        Self {
            playback_finished: clock.is_finished(),
            ..Self::new(clock.position(), calibration_offset, speed)
        }
    }

    pub fn with_inputs(mut self, inputs: &'a [InputEvent]) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn finished(mut self, finished: bool) -> Self {
        self.playback_finished = finished;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    /// Judgment clock the tick ran at
    pub clock: f64,
    pub progress: ProgressSnapshot,
    /// Outcomes recorded this tick: timeouts first, then inputs
    pub judgments: Vec<JudgmentEvent>,
    /// One outcome per queued input, in arrival order. `None` marks a press
    /// that matched no note.
    pub input_outcomes: Vec<JudgmentOutcome>,
    pub terminal: TerminalState,
}

/// One play-through of a chart.
///
/// Owns the active window and progress. The surrounding flow calls [`tick`]
/// once per frame and only sees snapshots.
///
/// [`tick`]: PlaySession::tick
#[derive(Debug)]
pub struct PlaySession {
    window: ActiveWindow,
    engine: JudgeEngine,
    progress: Progress,
    status: SessionStatus,
    last_clock: f64,
}

impl PlaySession {
    pub fn start(chart: Arc<Chart>, initial_health: i32) -> Self {
        Self::start_with_rule(chart, initial_health, PlayRule::default())
    }

    pub fn start_with_rule(chart: Arc<Chart>, initial_health: i32, rule: PlayRule) -> Self {
        info!(
            "Session start: {} notes, {:.2}s, health {}",
            chart.len(),
            chart.info().duration,
            initial_health
        );
        Self {
            window: ActiveWindow::new(chart),
            engine: JudgeEngine::new(rule),
            progress: Progress::new(rule, initial_health),
            status: SessionStatus::Playing,
            last_clock: 0.0,
        }
    }

    /// Advance one tick: timeouts and eviction, then queued inputs, then the
    /// terminal check. A finished or stopped session is left untouched.
    pub fn tick(&mut self, input: &TickInput<'_>) -> TickOutput {
        if self.status != SessionStatus::Playing {
            return self.idle_output(input.inputs.len());
        }

        let clock = judgment_clock(input.playback_position, input.calibration_offset);
        self.last_clock = clock;

        let rule = *self.engine.rule();
        let report = self.window.advance(clock, input.speed, &rule);

        let mut judgments = Vec::with_capacity(report.timed_out.len() + input.inputs.len());
        for index in report.timed_out {
            let Some(&note) = self.window.chart().note(index) else {
                continue;
            };
            let event = JudgmentEvent {
                note_index: index,
                lane: note.lane,
                outcome: JudgmentOutcome::Miss,
                offset: clock - note.timestamp,
            };
            self.progress.apply_event(&event);
            judgments.push(event);
        }

        let mut input_outcomes = Vec::with_capacity(input.inputs.len());
        for press in input.inputs {
            match self
                .engine
                .judge(&mut self.window, &mut self.progress, press.lane, press.time)
            {
                Some(event) => {
                    input_outcomes.push(event.outcome);
                    judgments.push(event);
                }
                None => input_outcomes.push(JudgmentOutcome::None),
            }
        }

        let terminal = self.check_terminal(input.playback_finished);
        if terminal.is_terminal() {
            self.status = SessionStatus::Finished(terminal);
            let snapshot = self.progress.snapshot();
            info!(
                "Session {:?} at {:.3}s: score {}, max combo {}, {}/{}/{} (P/G/M)",
                terminal,
                clock,
                snapshot.score,
                snapshot.max_combo,
                snapshot.perfect_count,
                snapshot.great_count,
                snapshot.miss_count
            );
        }

        TickOutput {
            clock,
            progress: self.progress.snapshot(),
            judgments,
            input_outcomes,
            terminal,
        }
    }

    fn check_terminal(&self, playback_finished: bool) -> TerminalState {
        if self.progress.is_depleted() {
            TerminalState::Failed
        } else if self.window.is_exhausted() && playback_finished {
            TerminalState::Completed
        } else {
            TerminalState::None
        }
    }

    /// Inputs given to an idle session are still answered, all with `None`.
    fn idle_output(&self, inputs: usize) -> TickOutput {
        TickOutput {
            clock: self.last_clock,
            progress: self.progress.snapshot(),
            judgments: Vec::new(),
            input_outcomes: vec![JudgmentOutcome::None; inputs],
            terminal: self.terminal(),
        }
    }

    /// Judge a single press outside of a tick. Returns `None` for a press that
    /// matches nothing, or when the session is not playing.
    pub fn judge(&mut self, lane: usize, time: f64) -> JudgmentOutcome {
        if self.status != SessionStatus::Playing {
            return JudgmentOutcome::None;
        }
        self.engine
            .judge(&mut self.window, &mut self.progress, lane, time)
            .map_or(JudgmentOutcome::None, |event| event.outcome)
    }

    /// Start over on `chart` with fresh progress.
    pub fn reset(&mut self, chart: Arc<Chart>) {
        info!("Session reset: {} notes", chart.len());
        self.window.replace_chart(chart);
        self.rewind();
    }

    /// Start over on the same chart.
    pub fn retry(&mut self) {
        info!("Session retry");
        self.window.reset();
        self.rewind();
    }

    fn rewind(&mut self) {
        self.progress.reset();
        self.status = SessionStatus::Playing;
        self.last_clock = 0.0;
    }

    pub fn stop(&mut self) {
        if self.status == SessionStatus::Playing {
            info!("Session stopped at {:.3}s", self.last_clock);
            self.status = SessionStatus::Stopped;
        }
    }

    pub fn active_notes(&self) -> impl Iterator<Item = ActiveNoteView> + '_ {
        self.window.iter()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    pub fn chart(&self) -> &Arc<Chart> {
        self.window.chart()
    }

    pub fn rule(&self) -> &PlayRule {
        self.engine.rule()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn terminal(&self) -> TerminalState {
        match self.status {
            SessionStatus::Finished(terminal) => terminal,
            _ => TerminalState::None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != SessionStatus::Playing
    }
}
