//! Game state and core simulation types
//!
//! Everything a run needs to advance deterministically lives in
//! [`GameState`]: the seeded RNG, the runner, scrolling entities, active
//! effects and the spawn timers.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::Achievements;
use super::difficulty::DifficultyState;
use super::effects::{ActiveEffects, EffectKind};
use super::geom::Rect;
use super::runner::Runner;
use super::spawner::Spawner;
use super::tokens::TokenTimers;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first jump input
    Ready,
    /// Active gameplay
    Running,
    /// Frozen; nothing advances until unpaused
    Paused,
    /// Run ended, terminal until reset
    GameOver,
}

/// Shared scrolling-entity data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner of the hitbox
    pub pos: Vec2,
    pub size: Vec2,
    /// Cleared once the body scrolls past the left edge
    pub active: bool,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Self {
            pos: rect.min,
            size: rect.size,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            min: self.pos,
            size: self.size,
        }
    }

    /// Scroll left by `dx`; deactivates once fully off-screen
    pub fn advance(&mut self, dx: f32) {
        self.pos.x -= dx;
        if self.pos.x + self.size.x < 0.0 {
            self.active = false;
        }
    }
}

/// Fixed flying heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeLane {
    /// Head height: duck under it
    Low,
    /// Above a standing runner: only a jump reaches it
    High,
}

impl AltitudeLane {
    pub const ALL: [AltitudeLane; 2] = [AltitudeLane::Low, AltitudeLane::High];

    /// Height of the obstacle's bottom edge above the ground
    pub fn altitude(self) -> f32 {
        match self {
            AltitudeLane::Low => 60.0,
            AltitudeLane::High => 130.0,
        }
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low-profile ground obstacle
    Rock,
    /// Tall ground obstacle
    Barrel,
    /// Wide ground obstacle
    Stump,
    /// Flying obstacle locked to a lane for its lifetime
    Bird { lane: AltitudeLane },
}

impl ObstacleKind {
    pub const GROUND: [ObstacleKind; 3] =
        [ObstacleKind::Rock, ObstacleKind::Barrel, ObstacleKind::Stump];

    pub fn width(self) -> f32 {
        match self {
            ObstacleKind::Rock => 48.0,
            ObstacleKind::Barrel => 44.0,
            ObstacleKind::Stump => 76.0,
            ObstacleKind::Bird { .. } => 70.0,
        }
    }

    pub fn height(self) -> f32 {
        match self {
            ObstacleKind::Rock => 40.0,
            ObstacleKind::Barrel => 80.0,
            ObstacleKind::Stump => 50.0,
            ObstacleKind::Bird { .. } => 40.0,
        }
    }

    pub fn size(self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn is_flying(self) -> bool {
        matches!(self, ObstacleKind::Bird { .. })
    }

    /// Height of the bottom edge above the ground (0 for ground obstacles)
    pub fn altitude(self) -> f32 {
        match self {
            ObstacleKind::Bird { lane } => lane.altitude(),
            _ => 0.0,
        }
    }

    /// Hitbox with its left edge at `x`
    pub fn rect_at(self, x: f32, ground_y: f32) -> Rect {
        Rect::standing_on(x, ground_y - self.altitude(), self.size())
    }

    /// Highest point above the ground any obstacle can occupy
    pub fn tallest_reach() -> f32 {
        let ground = Self::GROUND.iter().map(|k| k.height());
        let flying = AltitudeLane::ALL
            .iter()
            .map(|&lane| ObstacleKind::Bird { lane })
            .map(|k| k.altitude() + k.height());
        ground.chain(flying).fold(0.0, f32::max)
    }
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub body: Body,
    /// Set once the obstacle has fully passed the runner
    pub dodged: bool,
}

/// Collectible token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Currency, no timed effect
    Coin,
    ScoreMultiplier,
    SlowWorld,
    Invincibility,
}

impl TokenKind {
    /// Timed effect granted on pickup
    pub fn effect(self) -> Option<EffectKind> {
        match self {
            TokenKind::Coin => None,
            TokenKind::ScoreMultiplier => Some(EffectKind::ScoreMultiplier),
            TokenKind::SlowWorld => Some(EffectKind::SlowWorld),
            TokenKind::Invincibility => Some(EffectKind::Invincibility),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Coin => "coin",
            TokenKind::ScoreMultiplier => "score multiplier",
            TokenKind::SlowWorld => "slow world",
            TokenKind::Invincibility => "invincibility",
        }
    }
}

/// A token entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: u32,
    pub kind: TokenKind,
    pub body: Body,
    /// Coin value, or the effect magnitude (e.g. 2.0x, 0.7x)
    pub value: f32,
    /// Effect duration in seconds (0 for coins)
    pub duration: f32,
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub coins: u64,
    pub obstacles_dodged: u32,
    pub tokens_collected: u32,
    /// Seconds of active running
    pub elapsed: f32,
    pub achievements: Achievements,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the run was created with
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub difficulty: DifficultyState,
    pub runner: Runner,
    /// Active obstacles, in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Active tokens, in spawn order
    pub tokens: Vec<Token>,
    pub effects: ActiveEffects,
    pub spawner: Spawner,
    pub token_timers: TokenTimers,
    pub stats: RunStats,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed. `tuning` is expected to be
    /// validated already (see [`Tuning::validate`]).
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spawner = Spawner::new(&mut rng, &tuning);
        let token_timers = TokenTimers::new(&mut rng, &tuning);
        Self {
            seed,
            difficulty: DifficultyState::new(&tuning.speed),
            runner: Runner::new(&tuning),
            rng,
            phase: GamePhase::Ready,
            obstacles: Vec::new(),
            tokens: Vec::new(),
            effects: ActiveEffects::default(),
            spawner,
            token_timers,
            stats: RunStats::default(),
            time_ticks: 0,
            next_id: 1,
            tuning,
        }
    }

    /// Reinitialize for a new run. The RNG keeps its stream so successive
    /// runs differ; use [`GameState::new`] to replay a seed.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Ready;
        self.difficulty = DifficultyState::new(&self.tuning.speed);
        self.runner = Runner::new(&self.tuning);
        self.obstacles.clear();
        self.tokens.clear();
        self.effects = ActiveEffects::default();
        self.spawner = Spawner::new(&mut self.rng, &self.tuning);
        self.token_timers = TokenTimers::new(&mut self.rng, &self.tuning);
        self.stats = RunStats::default();
        self.time_ticks = 0;
        self.next_id = 1;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an obstacle with its left edge at `x`
    pub fn push_obstacle(&mut self, kind: ObstacleKind, x: f32) -> u32 {
        let id = self.next_entity_id();
        let rect = kind.rect_at(x, self.tuning.world.ground_y);
        self.obstacles.push(Obstacle {
            id,
            kind,
            body: Body::new(rect),
            dodged: false,
        });
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Score as whole points
    pub fn score_points(&self) -> u64 {
        self.difficulty.score.max(0.0).floor() as u64
    }
}
