//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, entity IDs ascending)
//! - No rendering, audio or file IO

pub mod achievements;
pub mod autopilot;
pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod geom;
pub mod runner;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod tokens;

pub use achievements::{Achievement, Achievements, Progress};
pub use collision::{CollisionReport, resolve};
pub use difficulty::{DifficultyState, base_speed, tier_for};
pub use effects::{ActiveEffects, EffectKind, EffectSlot};
pub use geom::Rect;
pub use runner::{Runner, RunnerPose};
pub use spawner::Spawner;
pub use state::{
    AltitudeLane, Body, GamePhase, GameState, Obstacle, ObstacleKind, RunStats, Token, TokenKind,
};
pub use tick::{EntityKind, EntityView, FrameResult, GameEvent, TickInput, snapshot, tick};
pub use tokens::TokenTimers;
