use serde::{Deserialize, Serialize};

/// Smallest speed multiplier honored by the look-ahead computation.
pub const MIN_SPEED: f64 = 0.01;

/// Gap kept between the miss window and the eviction grace.
const MIN_EVICTION_MARGIN: f64 = 0.1;

/// Timing tolerances, scoring and health constants for one session.
///
/// All times are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayRule {
    pub perfect_window: f64,
    pub great_window: f64,
    /// Distance in pixels a note falls before reaching the judgment line
    pub fall_distance: f64,
    /// Fall speed at a speed multiplier of 1.0
    pub pixels_per_second: f64,
    /// How long a judged note stays in the window after its timestamp
    pub eviction_grace: f64,
    pub perfect_score: u32,
    pub great_score: u32,
    pub perfect_recovery: i32,
    pub great_recovery: i32,
    pub miss_damage: i32,
    pub max_health: i32,
}

impl Default for PlayRule {
    fn default() -> Self {
        Self {
            perfect_window: 0.08,
            great_window: 0.15,
            // Judgment line sits 100px above the bottom of a 1080px field
            fall_distance: 980.0,
            pixels_per_second: 350.0,
            eviction_grace: 1.0,
            perfect_score: 100,
            great_score: 50,
            perfect_recovery: 2,
            great_recovery: 1,
            miss_damage: 10,
            max_health: 100,
        }
    }
}

impl PlayRule {
    pub fn builder() -> PlayRuleBuilder {
        PlayRuleBuilder::default()
    }

    /// An unjudged note older than this times out as a miss.
    pub fn miss_window(&self) -> f64 {
        self.great_window
    }

    /// How far ahead of its timestamp a note enters the window.
    pub fn look_ahead(&self, speed: f64) -> f64 {
        debug_assert!(speed > 0.0, "speed multiplier must be positive: {speed}");
        self.fall_distance / (self.pixels_per_second * speed.max(MIN_SPEED))
    }
}

#[derive(Debug, Default)]
pub struct PlayRuleBuilder {
    perfect_window: Option<f64>,
    great_window: Option<f64>,
    fall_distance: Option<f64>,
    pixels_per_second: Option<f64>,
    eviction_grace: Option<f64>,
    perfect_score: Option<u32>,
    great_score: Option<u32>,
    perfect_recovery: Option<i32>,
    great_recovery: Option<i32>,
    miss_damage: Option<i32>,
    max_health: Option<i32>,
}

impl PlayRuleBuilder {
    pub fn perfect_window(mut self, secs: f64) -> Self {
        self.perfect_window = Some(secs);
        self
    }

    pub fn great_window(mut self, secs: f64) -> Self {
        self.great_window = Some(secs);
        self
    }

    pub fn fall_distance(mut self, pixels: f64) -> Self {
        self.fall_distance = Some(pixels);
        self
    }

    pub fn pixels_per_second(mut self, pixels: f64) -> Self {
        self.pixels_per_second = Some(pixels);
        self
    }

    pub fn eviction_grace(mut self, secs: f64) -> Self {
        self.eviction_grace = Some(secs);
        self
    }

    pub fn perfect_score(mut self, score: u32) -> Self {
        self.perfect_score = Some(score);
        self
    }

    pub fn great_score(mut self, score: u32) -> Self {
        self.great_score = Some(score);
        self
    }

    pub fn perfect_recovery(mut self, health: i32) -> Self {
        self.perfect_recovery = Some(health);
        self
    }

    pub fn great_recovery(mut self, health: i32) -> Self {
        self.great_recovery = Some(health);
        self
    }

    pub fn miss_damage(mut self, health: i32) -> Self {
        self.miss_damage = Some(health);
        self
    }

    pub fn max_health(mut self, health: i32) -> Self {
        self.max_health = Some(health);
        self
    }

    /// Fill unset fields from the defaults and restore the ordering between windows.
    /// Recovery and damage are never negative.
    pub fn build(self) -> PlayRule {
        let default = PlayRule::default();
        let perfect_window = self.perfect_window.unwrap_or(default.perfect_window).max(0.0);
        let great_window = self
            .great_window
            .unwrap_or(default.great_window)
            .max(perfect_window);
        let mut eviction_grace = self.eviction_grace.unwrap_or(default.eviction_grace);
        if eviction_grace <= great_window {
            eviction_grace = great_window + MIN_EVICTION_MARGIN;
        }

        PlayRule {
            perfect_window,
            great_window,
            fall_distance: self.fall_distance.unwrap_or(default.fall_distance),
            pixels_per_second: self.pixels_per_second.unwrap_or(default.pixels_per_second),
            eviction_grace,
            perfect_score: self.perfect_score.unwrap_or(default.perfect_score),
            great_score: self.great_score.unwrap_or(default.great_score),
            perfect_recovery: self.perfect_recovery.unwrap_or(default.perfect_recovery).max(0),
            great_recovery: self.great_recovery.unwrap_or(default.great_recovery).max(0),
            miss_damage: self.miss_damage.unwrap_or(default.miss_damage).max(0),
            max_health: self.max_health.unwrap_or(default.max_health).max(1),
        }
    }
}
