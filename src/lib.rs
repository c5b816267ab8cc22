//! Dino Run - an endless side-scrolling runner core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, difficulty, powerups, collisions)
//! - `tuning`: Data-driven game balance
//! - `highscores`: High score persistence
//! - `app`: Composition root tying the simulation to its collaborators
//!
//! Rendering, input polling and audio are left to the embedding application.
//! They consume [`sim::FrameResult`] and produce [`sim::TickInput`].

pub mod app;
pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use app::App;
pub use error::{ConfigError, PersistenceError};
pub use highscores::{HighScoreStore, JsonFileStore, MemoryStore};
pub use tuning::{Difficulty, Tuning};

/// Game loop constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest real frame time fed into the accumulator (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.1;
    /// Target frame rate for the native driver
    pub const TARGET_FPS: u32 = 60;
}
