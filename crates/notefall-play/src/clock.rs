use std::cell::Cell;
use std::time::{Duration, Instant};

/// Map a playback position onto the judgment clock.
///
/// `calibration_offset` compensates output latency and may be negative. The
/// result is not clamped: it is legitimately negative during lead-in.
pub fn judgment_clock(playback_position: f64, calibration_offset: f64) -> f64 {
    playback_position + calibration_offset
}

/// Abstraction over an audio playback position.
/// Implementations: InstantClock (wall clock), ManualClock (testing, headless runs).
pub trait PlaybackClock {
    /// Playback position in seconds.
    fn position(&self) -> f64;

    /// Whether playback has reached the end of the audio.
    fn is_finished(&self) -> bool;
}

/// Playback clock driven by `std::time::Instant`.
pub struct InstantClock {
    start: Instant,
    length: Duration,
    lead_in: f64,
}

impl InstantClock {
    pub fn new(length_secs: f64) -> Self {
        Self::with_lead_in(length_secs, 0.0)
    }

    /// Position starts at `-lead_in_secs` and reaches the audio end at `length_secs`.
    pub fn with_lead_in(length_secs: f64, lead_in_secs: f64) -> Self {
        let lead_in = lead_in_secs.max(0.0);
        Self {
            start: Instant::now(),
            length: Duration::from_secs_f64((length_secs.max(0.0)) + lead_in),
            lead_in,
        }
    }
}

impl PlaybackClock for InstantClock {
    fn position(&self) -> f64 {
        self.start.elapsed().as_secs_f64() - self.lead_in
    }

    fn is_finished(&self) -> bool {
        self.start.elapsed() >= self.length
    }
}

/// Hand-driven playback clock for deterministic runs.
pub struct ManualClock {
    position: Cell<f64>,
    length: f64,
}

impl ManualClock {
    pub fn new(length_secs: f64) -> Self {
        Self {
            position: Cell::new(0.0),
            length: length_secs,
        }
    }

    pub fn set_position(&self, secs: f64) {
        self.position.set(secs);
    }

    pub fn advance(&self, delta_secs: f64) {
        self.position.set(self.position.get() + delta_secs);
    }
}

impl PlaybackClock for ManualClock {
    fn position(&self) -> f64 {
        self.position.get()
    }

    fn is_finished(&self) -> bool {
        self.position.get() >= self.length
    }
}

/// A key press on one lane, stamped on the judgment clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub lane: usize,
    /// Judgment-clock time in seconds
    pub time: f64,
}

impl InputEvent {
    pub fn new(lane: usize, time: f64) -> Self {
        Self { lane, time }
    }

    /// Stamp a press captured at a raw playback position.
    pub fn from_playback(lane: usize, playback_position: f64, calibration_offset: f64) -> Self {
        Self::new(lane, judgment_clock(playback_position, calibration_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judgment_clock_adds_offset() {
        assert_eq!(judgment_clock(10.0, 0.0), 10.0);
        assert!((judgment_clock(10.0, 0.025) - 10.025).abs() < 1e-12);
        assert!((judgment_clock(10.0, -0.05) - 9.95).abs() < 1e-12);
    }

    #[test]
    fn judgment_clock_negative_during_lead_in() {
        assert!(judgment_clock(0.0, -0.1) < 0.0);
        assert!(judgment_clock(-1.5, 0.2) < 0.0);
    }

    #[test]
    fn manual_clock_advance() {
        let clock = ManualClock::new(2.0);
        assert_eq!(clock.position(), 0.0);
        assert!(!clock.is_finished());

        clock.advance(1.5);
        assert_eq!(clock.position(), 1.5);
        assert!(!clock.is_finished());

        clock.advance(0.5);
        assert!(clock.is_finished());
    }

    #[test]
    fn manual_clock_set() {
        let clock = ManualClock::new(10.0);
        clock.set_position(-0.5);
        assert_eq!(clock.position(), -0.5);
        clock.set_position(10.0);
        assert!(clock.is_finished());
    }

    #[test]
    fn instant_clock_monotonic() {
        let clock = InstantClock::new(60.0);
        let t1 = clock.position();
        let t2 = clock.position();
        assert!(t2 >= t1);
        assert!(!clock.is_finished());
    }

    #[test]
    fn instant_clock_lead_in_starts_negative() {
        let clock = InstantClock::with_lead_in(60.0, 2.0);
        assert!(clock.position() < 0.0);
    }

    #[test]
    fn input_from_playback_uses_offset() {
        let input = InputEvent::from_playback(3, 5.0, 0.03);
        assert_eq!(input.lane, 3);
        assert!((input.time - 5.03).abs() < 1e-12);
    }
}
