use std::time::Duration;

use log::{debug, warn};
use notefall_play::{
    InputEvent, PlaySession, PlaybackClock, ProgressSnapshot, TerminalState, TickInput,
    judgment_clock,
};

use crate::player::ScriptedPlayer;

/// Simulated audio keeps playing this long after the last note.
pub const AUDIO_TAIL_SECS: f64 = 2.0;

/// Ticks allowed past the audio end before the run is abandoned.
const OVERRUN_SECS: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct DriveSettings {
    pub fps: u32,
    pub speed: f64,
    pub calibration_offset: f64,
    pub audio_length: f64,
}

impl DriveSettings {
    pub fn tick_interval(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub terminal: TerminalState,
    pub progress: ProgressSnapshot,
    pub ticks: u64,
    pub clock: f64,
}

/// Run `session` to its end against `clock`.
///
/// `wait` is called before every tick and is what moves the clock forward:
/// advancing a manual clock, or sleeping for a wall-clock one.
pub fn drive<C: PlaybackClock>(
    session: &mut PlaySession,
    player: &mut ScriptedPlayer,
    clock: &C,
    settings: &DriveSettings,
    mut wait: impl FnMut(&C),
) -> RunSummary {
    let mut presses: Vec<InputEvent> = Vec::new();
    let mut ticks = 0;
    let mut last_clock = 0.0;

    while !session.is_finished() {
        wait(clock);

        let position = clock.position();
        if position > settings.audio_length + OVERRUN_SECS {
            warn!("Session did not finish {OVERRUN_SECS}s after audio end, stopping");
            session.stop();
            break;
        }

        presses.clear();
        player.presses_until(
            judgment_clock(position, settings.calibration_offset),
            &mut presses,
        );

        let input = TickInput::from_clock(clock, settings.calibration_offset, settings.speed)
            .with_inputs(&presses);
        let out = session.tick(&input);
        ticks += 1;
        last_clock = out.clock;

        for event in &out.judgments {
            debug!(
                "{:>8.3} lane {} {:?} ({:+.0}ms)",
                out.clock,
                event.lane,
                event.outcome,
                event.offset * 1000.0
            );
        }
    }

    RunSummary {
        terminal: session.terminal(),
        progress: session.progress(),
        ticks,
        clock: last_clock,
    }
}

pub fn sleep_interval(settings: &DriveSettings) -> Duration {
    Duration::from_secs_f64(settings.tick_interval())
}
