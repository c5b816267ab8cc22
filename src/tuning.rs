//! Data-driven game balance
//!
//! Every constant the spawner, difficulty model and token system read lives
//! here. Values load from JSON; missing fields fall back to the defaults
//! below. [`Tuning::validate`] runs before a run is created so a bad file
//! fails at startup instead of mid-game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::ObstacleKind;

/// Difficulty preset applied on top of a tuning table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on start and max speed
    pub fn speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Multiplier on the gap between obstacle groups
    pub fn gap_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.33,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
        }
    }

    /// Scale the speeds and gap range of `tuning`. `Normal` leaves it as is.
    pub fn apply(&self, mut tuning: Tuning) -> Tuning {
        let speed = self.speed_scale();
        tuning.speed.start_speed *= speed;
        tuning.speed.max_speed *= speed;
        let gap = self.gap_scale();
        tuning.spawn.gap_min *= gap;
        tuning.spawn.gap_max *= gap;
        tuning
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub speed: SpeedTuning,
    pub runner: RunnerTuning,
    pub spawn: SpawnTuning,
    pub tokens: TokenTuning,
}

/// Viewport geometry (pixels, y grows downward)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Y of the ground surface the runner stands on
    pub ground_y: f32,
    /// Fixed x of the runner's left edge
    pub runner_x: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            viewport_width: 1152.0,
            viewport_height: 648.0,
            ground_y: 540.0,
            runner_x: 150.0,
        }
    }
}

/// Score to speed/tier mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTuning {
    /// Base speed at score 0 (px/s)
    pub start_speed: f32,
    /// Base speed cap (px/s)
    pub max_speed: f32,
    /// Score points per +1 px/s of base speed
    pub speed_modifier: f32,
    /// Score points per pixel of base-speed distance
    pub score_rate: f32,
    /// Score points per difficulty tier
    pub tier_modifier: f32,
    /// Highest tier; unlocks flying obstacles
    pub max_tier: u32,
}

impl Default for SpeedTuning {
    fn default() -> Self {
        Self {
            start_speed: 600.0,
            max_speed: 1500.0,
            speed_modifier: 10.0,
            score_rate: 0.1,
            tier_modifier: 500.0,
            max_tier: 2,
        }
    }
}

/// Runner physics and hitbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Initial upward speed of a jump (px/s)
    pub jump_speed: f32,
    pub width: f32,
    /// Standing hitbox height
    pub height: f32,
    /// Ducking hitbox height (bottom stays on the ground)
    pub duck_height: f32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            gravity: 4500.0,
            jump_speed: 1500.0,
            width: 70.0,
            height: 100.0,
            duck_height: 50.0,
        }
    }
}

/// Obstacle group spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Minimum world-space gap between groups (px)
    pub gap_min: f32,
    /// Maximum world-space gap between groups (px)
    pub gap_max: f32,
    /// Horizontal step inside a group, as a multiple of each obstacle's width
    pub cluster_spacing: f32,
    /// Chance that a spawn decision at max tier produces a flying obstacle
    pub flying_probability: f64,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            gap_min: 450.0,
            gap_max: 750.0,
            cluster_spacing: 1.25,
            flying_probability: 0.5,
        }
    }
}

/// Coin and powerup tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenTuning {
    pub coin_interval_min: f32,
    pub coin_interval_max: f32,
    /// Coin interval shrinks by this fraction per tier...
    pub coin_interval_tier_step: f32,
    /// ...but never below this fraction of the base interval
    pub coin_interval_floor: f32,
    pub powerup_interval_min: f32,
    pub powerup_interval_max: f32,
    /// Spawn x offset past the right edge of the viewport
    pub spawn_offset_min: f32,
    pub spawn_offset_max: f32,
    /// Candidate heights of a token's center above the ground
    pub altitudes: Vec<f32>,
    /// Token edge length (tokens are square)
    pub size: f32,
    /// Obstacle rectangles are inflated by this much when placing tokens
    pub safety_margin: f32,
    pub max_placement_attempts: u32,
    pub coin_value: u64,

    pub multiplier_probability: f64,
    pub multiplier_value: f32,
    pub multiplier_duration: f32,

    pub slow_min_score: f64,
    pub slow_factor: f32,
    pub slow_duration: f32,

    pub invincibility_min_score: f64,
    pub invincibility_probability: f64,
    pub invincibility_duration: f32,
}

impl Default for TokenTuning {
    fn default() -> Self {
        Self {
            coin_interval_min: 3.0,
            coin_interval_max: 8.0,
            coin_interval_tier_step: 0.2,
            coin_interval_floor: 0.5,
            powerup_interval_min: 10.0,
            powerup_interval_max: 20.0,
            spawn_offset_min: 100.0,
            spawn_offset_max: 400.0,
            altitudes: vec![50.0, 150.0, 250.0],
            size: 32.0,
            safety_margin: 24.0,
            max_placement_attempts: 10,
            coin_value: 1,

            multiplier_probability: 0.5,
            multiplier_value: 2.0,
            multiplier_duration: 10.0,

            slow_min_score: 300.0,
            slow_factor: 0.7,
            slow_duration: 5.0,

            invincibility_min_score: 1500.0,
            invincibility_probability: 0.35,
            invincibility_duration: 4.0,
        }
    }
}

impl Tuning {
    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&contents)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Highest y a token may occupy while staying clear of every obstacle
    /// profile (top edge of the fallback lane).
    pub fn token_fallback_y(&self) -> f32 {
        let highest_obstacle_top = self.world.ground_y - ObstacleKind::tallest_reach();
        highest_obstacle_top - self.tokens.safety_margin - self.tokens.size - 1.0
    }

    /// Check every value for range and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        positive("world.viewport_width", w.viewport_width)?;
        positive("world.viewport_height", w.viewport_height)?;
        positive("world.ground_y", w.ground_y)?;
        if w.ground_y > w.viewport_height {
            return Err(ConfigError::invalid(
                "world.ground_y",
                "ground lies below the viewport",
            ));
        }
        non_negative("world.runner_x", w.runner_x)?;
        if w.runner_x + self.runner.width > w.viewport_width {
            return Err(ConfigError::invalid(
                "world.runner_x",
                "runner does not fit in the viewport",
            ));
        }

        let s = &self.speed;
        positive("speed.start_speed", s.start_speed)?;
        positive("speed.max_speed", s.max_speed)?;
        if s.max_speed < s.start_speed {
            return Err(ConfigError::invalid(
                "speed.max_speed",
                "must not be below start_speed",
            ));
        }
        positive("speed.speed_modifier", s.speed_modifier)?;
        positive("speed.score_rate", s.score_rate)?;
        positive("speed.tier_modifier", s.tier_modifier)?;

        let r = &self.runner;
        positive("runner.gravity", r.gravity)?;
        positive("runner.jump_speed", r.jump_speed)?;
        positive("runner.width", r.width)?;
        positive("runner.height", r.height)?;
        positive("runner.duck_height", r.duck_height)?;
        if r.duck_height > r.height {
            return Err(ConfigError::invalid(
                "runner.duck_height",
                "ducking must not grow the hitbox",
            ));
        }
        if r.height > w.ground_y {
            return Err(ConfigError::invalid(
                "runner.height",
                "runner does not fit above the ground",
            ));
        }

        let sp = &self.spawn;
        non_negative("spawn.gap_min", sp.gap_min)?;
        ordered("spawn.gap_max", sp.gap_min, sp.gap_max)?;
        if !sp.cluster_spacing.is_finite() || sp.cluster_spacing < 1.0 {
            return Err(ConfigError::invalid(
                "spawn.cluster_spacing",
                "must be at least 1.0 so grouped obstacles never overlap",
            ));
        }
        probability("spawn.flying_probability", sp.flying_probability)?;
        if ObstacleKind::tallest_reach() > w.ground_y {
            return Err(ConfigError::invalid(
                "world.ground_y",
                "obstacles would extend above the viewport",
            ));
        }

        let t = &self.tokens;
        positive("tokens.coin_interval_min", t.coin_interval_min)?;
        ordered("tokens.coin_interval_max", t.coin_interval_min, t.coin_interval_max)?;
        non_negative("tokens.coin_interval_tier_step", t.coin_interval_tier_step)?;
        if !(t.coin_interval_floor > 0.0 && t.coin_interval_floor <= 1.0) {
            return Err(ConfigError::invalid(
                "tokens.coin_interval_floor",
                "must be in (0, 1]",
            ));
        }
        positive("tokens.powerup_interval_min", t.powerup_interval_min)?;
        ordered(
            "tokens.powerup_interval_max",
            t.powerup_interval_min,
            t.powerup_interval_max,
        )?;
        non_negative("tokens.spawn_offset_min", t.spawn_offset_min)?;
        ordered("tokens.spawn_offset_max", t.spawn_offset_min, t.spawn_offset_max)?;
        if t.altitudes.is_empty() {
            return Err(ConfigError::invalid("tokens.altitudes", "must not be empty"));
        }
        for &altitude in &t.altitudes {
            positive("tokens.altitudes", altitude)?;
            if altitude + t.size / 2.0 > w.ground_y {
                return Err(ConfigError::invalid(
                    "tokens.altitudes",
                    format!("altitude {altitude} leaves the viewport"),
                ));
            }
        }
        positive("tokens.size", t.size)?;
        non_negative("tokens.safety_margin", t.safety_margin)?;
        if t.max_placement_attempts == 0 {
            return Err(ConfigError::invalid(
                "tokens.max_placement_attempts",
                "must be at least 1",
            ));
        }
        if self.token_fallback_y() < 0.0 {
            return Err(ConfigError::invalid(
                "tokens.safety_margin",
                "no token height clears every obstacle inside the viewport",
            ));
        }

        probability("tokens.multiplier_probability", t.multiplier_probability)?;
        positive("tokens.multiplier_value", t.multiplier_value)?;
        positive("tokens.multiplier_duration", t.multiplier_duration)?;

        non_negative("tokens.slow_min_score", t.slow_min_score as f32)?;
        if !(t.slow_factor > 0.0 && t.slow_factor <= 1.0) {
            return Err(ConfigError::invalid("tokens.slow_factor", "must be in (0, 1]"));
        }
        positive("tokens.slow_duration", t.slow_duration)?;

        non_negative("tokens.invincibility_min_score", t.invincibility_min_score as f32)?;
        probability(
            "tokens.invincibility_probability",
            t.invincibility_probability,
        )?;
        positive("tokens.invincibility_duration", t.invincibility_duration)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} must not be negative"),
        ))
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if max.is_finite() && max >= min {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{max} is below the minimum {min}"),
        ))
    }
}

fn probability(field: &'static str, p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{p} is not in [0, 1]")))
    }
}
