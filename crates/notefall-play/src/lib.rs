// Judgment core: reference clock, active window, judge engine, progress, session

mod clock;
mod judge;
mod progress;
mod rule;
mod session;
mod window;

pub use clock::{InputEvent, InstantClock, ManualClock, PlaybackClock, judgment_clock};
pub use judge::{JudgeEngine, JudgmentEvent, JudgmentOutcome, TimingDirection};
pub use progress::{Progress, ProgressSnapshot};
pub use rule::{MIN_SPEED, PlayRule, PlayRuleBuilder};
pub use session::{PlaySession, SessionStatus, TerminalState, TickInput, TickOutput};
pub use window::{ActiveNote, ActiveNoteView, ActiveWindow, AdvanceReport};
