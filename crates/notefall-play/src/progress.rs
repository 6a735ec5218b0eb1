use serde::{Deserialize, Serialize};

use crate::judge::{JudgmentEvent, JudgmentOutcome, TimingDirection};
use crate::rule::PlayRule;

/// Score, combo, tier counts and health for one session.
///
/// Only judgment outcomes change it. Score and counts never decrease until `reset`.
#[derive(Debug, Clone)]
pub struct Progress {
    rule: PlayRule,
    initial_health: i32,
    score: u32,
    combo: u32,
    max_combo: u32,
    perfect_count: u32,
    great_count: u32,
    miss_count: u32,
    fast_count: u32,
    slow_count: u32,
    health: i32,
}

impl Progress {
    pub fn new(rule: PlayRule, initial_health: i32) -> Self {
        let initial_health = initial_health.clamp(0, rule.max_health);
        Self {
            rule,
            initial_health,
            score: 0,
            combo: 0,
            max_combo: 0,
            perfect_count: 0,
            great_count: 0,
            miss_count: 0,
            fast_count: 0,
            slow_count: 0,
            health: initial_health,
        }
    }

    pub fn apply(&mut self, outcome: JudgmentOutcome) {
        match outcome {
            JudgmentOutcome::Perfect => {
                self.perfect_count += 1;
                self.score = self.score.saturating_add(self.rule.perfect_score);
                self.change_health(self.rule.perfect_recovery);
            }
            JudgmentOutcome::Great => {
                self.great_count += 1;
                self.score = self.score.saturating_add(self.rule.great_score);
                self.change_health(self.rule.great_recovery);
            }
            JudgmentOutcome::Miss => {
                self.miss_count += 1;
                self.change_health(self.rule.miss_damage.saturating_neg());
            }
            JudgmentOutcome::None => {}
        }

        if outcome.is_hit() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else if outcome.is_combo_break() {
            self.combo = 0;
        }
    }

    /// Apply an event's outcome and count FAST/SLOW for Great hits.
    pub fn apply_event(&mut self, event: &JudgmentEvent) {
        self.apply(event.outcome);
        if event.outcome == JudgmentOutcome::Great {
            match event.direction() {
                TimingDirection::Fast => self.fast_count += 1,
                TimingDirection::Slow => self.slow_count += 1,
                TimingDirection::Exact => {}
            }
        }
    }

    fn change_health(&mut self, delta: i32) {
        self.health = self.health.saturating_add(delta).clamp(0, self.rule.max_health);
    }

    pub fn is_depleted(&self) -> bool {
        self.health == 0
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Back to the starting state, keeping rule and initial health.
    pub fn reset(&mut self) {
        *self = Self::new(self.rule, self.initial_health);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let judged = self.perfect_count + self.great_count + self.miss_count;
        ProgressSnapshot {
            score: self.score,
            combo: self.combo,
            max_combo: self.max_combo,
            perfect_count: self.perfect_count,
            great_count: self.great_count,
            miss_count: self.miss_count,
            fast_count: self.fast_count,
            slow_count: self.slow_count,
            health: self.health,
            max_score: judged.saturating_mul(self.rule.perfect_score),
        }
    }
}

/// Read-only copy of [`Progress`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub perfect_count: u32,
    pub great_count: u32,
    pub miss_count: u32,
    pub fast_count: u32,
    pub slow_count: u32,
    pub health: i32,
    /// Best possible score for the notes judged so far
    pub max_score: u32,
}

impl ProgressSnapshot {
    pub fn judged_count(&self) -> u32 {
        self.perfect_count + self.great_count + self.miss_count
    }

    pub fn is_full_combo(&self) -> bool {
        self.miss_count == 0 && self.judged_count() > 0
    }

    /// Score as a percentage of the best possible score so far.
    pub fn accuracy(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.score as f64 / self.max_score as f64 * 100.0
    }

    pub fn rank(&self) -> &'static str {
        let acc = self.accuracy();
        if acc >= 100.0 {
            "MAX"
        } else if acc >= 94.44 {
            "AAA"
        } else if acc >= 88.88 {
            "AA"
        } else if acc >= 77.77 {
            "A"
        } else if acc >= 66.66 {
            "B"
        } else if acc >= 55.55 {
            "C"
        } else if acc >= 44.44 {
            "D"
        } else if acc >= 33.33 {
            "E"
        } else {
            "F"
        }
    }
}
