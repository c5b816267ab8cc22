//! Score to speed mapping
//!
//! Two speeds come out of the score. Base speed depends on score alone and
//! drives scoring. World speed is base speed scaled by the slow-world
//! effect and moves everything on screen. Score accrual never reads world
//! speed, so slowing the world does not slow the score.

use serde::{Deserialize, Serialize};

use super::effects::ActiveEffects;
use crate::tuning::SpeedTuning;

/// Base speed for a score: `min(start + score / modifier, max)`
pub fn base_speed(score: f64, tuning: &SpeedTuning) -> f32 {
    let raw = tuning.start_speed as f64 + score.max(0.0) / tuning.speed_modifier as f64;
    raw.min(tuning.max_speed as f64) as f32
}

/// Difficulty tier for a score: `min(floor(score / modifier), max_tier)`
pub fn tier_for(score: f64, tuning: &SpeedTuning) -> u32 {
    let tier = (score.max(0.0) / tuning.tier_modifier as f64).floor();
    (tier as u32).min(tuning.max_tier)
}

/// Current score and the speeds derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Monotonic, never reduced by slow-world
    pub score: f64,
    pub base_speed: f32,
    pub world_speed: f32,
    pub tier: u32,
}

impl DifficultyState {
    pub fn new(tuning: &SpeedTuning) -> Self {
        let base = base_speed(0.0, tuning);
        Self {
            score: 0.0,
            base_speed: base,
            world_speed: base,
            tier: 0,
        }
    }

    /// Accrue score for `dt` seconds at the unmodified base speed
    pub fn accrue(&mut self, dt: f32, tuning: &SpeedTuning) {
        if dt > 0.0 {
            self.score += self.base_speed as f64 * dt as f64 * tuning.score_rate as f64;
        }
    }

    /// Uncapped level: one more every `tier_modifier` points, starting at 1
    pub fn level(&self, tuning: &SpeedTuning) -> u32 {
        (self.score.max(0.0) / tuning.tier_modifier as f64).floor() as u32 + 1
    }

    /// How many times faster than the starting speed the base speed is
    pub fn speed_multiplier(&self, tuning: &SpeedTuning) -> f32 {
        self.base_speed / tuning.start_speed
    }

    /// Recompute speeds and tier. Returns the new tier if it went up.
    pub fn recompute(&mut self, tuning: &SpeedTuning, effects: &ActiveEffects) -> Option<u32> {
        self.base_speed = base_speed(self.score, tuning);
        self.world_speed = self.base_speed * effects.slow_factor();

        let tier = tier_for(self.score, tuning);
        let raised = tier > self.tier;
        self.tier = tier;
        raised.then_some(tier)
    }
}
