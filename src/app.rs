//! Composition root
//!
//! [`App`] owns the game state and the high score store and drives the
//! simulation from real frame time with a fixed-timestep accumulator.
//! Renderers, input and audio sit outside and talk to it through
//! [`TickInput`] and [`FrameResult`].

use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS, SIM_DT};
use crate::error::{ConfigError, PersistenceError};
use crate::highscores::HighScoreStore;
use crate::sim::{FrameResult, GameEvent, GameState, TickInput, snapshot, tick};
use crate::tuning::Tuning;

pub struct App<S: HighScoreStore> {
    state: GameState,
    store: S,
    high_score: u64,
    accumulator: f32,
}

impl<S: HighScoreStore> App<S> {
    /// Validate `tuning`, read the stored high score and prepare a run.
    ///
    /// An unreadable store is not fatal: the high score starts at 0.
    pub fn new(tuning: Tuning, seed: u64, store: S) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let high_score = store.load().unwrap_or_else(|e| {
            log::warn!("Failed to load high score, starting at 0: {e}");
            0
        });
        Ok(Self {
            state: GameState::new(seed, tuning),
            store,
            high_score,
            accumulator: 0.0,
        })
    }

    /// Run exactly one simulation step of `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> FrameResult {
        let mut result = tick(&mut self.state, input, dt);
        self.record_game_over(&mut result.events);
        result
    }

    /// Feed real elapsed time into the accumulator and run as many fixed
    /// steps as fit (at most `MAX_SUBSTEPS`). `jump` and `pause` are
    /// one-shot and only apply to the first step; `duck` is held.
    /// A non-finite `elapsed` counts as no time at all.
    pub fn advance(&mut self, elapsed: f32, input: &TickInput) -> FrameResult {
        let elapsed = if elapsed.is_finite() { elapsed } else { 0.0 };
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_TIME);

        let mut input = *input;
        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let result = self.tick(SIM_DT, &input);
            events.extend(result.events);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.jump = false;
            input.pause = false;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        snapshot(&self.state, events)
    }

    fn record_game_over(&mut self, events: &mut Vec<GameEvent>) {
        let score = events.iter().find_map(|e| match e {
            GameEvent::GameOver { score } => Some(*score),
            _ => None,
        });
        let Some(score) = score else {
            return;
        };
        if score <= self.high_score {
            return;
        }

        self.high_score = score;
        log::info!("New high score: {score}");
        if let Err(e) = self.store.save(score) {
            log::warn!("Failed to save high score: {e}");
        }
        events.push(GameEvent::NewHighScore(score));
    }

    /// Start a new run. The stored high score is kept.
    pub fn reset(&mut self) {
        self.state.reset();
        self.accumulator = 0.0;
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Overwrite the high score and persist it
    pub fn set_high_score(&mut self, score: u64) -> Result<(), PersistenceError> {
        self.store.save(score)?;
        self.high_score = score;
        Ok(())
    }

    /// Re-read the high score from the store
    pub fn reload_high_score(&mut self) -> Result<u64, PersistenceError> {
        self.high_score = self.store.load()?;
        Ok(self.high_score)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
