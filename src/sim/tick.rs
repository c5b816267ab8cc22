//! Fixed timestep simulation tick
//!
//! One call advances the run by `dt` seconds: input and runner physics,
//! effect decay, spawning, scrolling, collisions, then score and
//! difficulty. Everything that happened is returned in the [`FrameResult`]
//! so renderers and audio never need a handle back into the state.

use serde::{Deserialize, Serialize};

use super::achievements::{Achievement, Progress};
use super::autopilot;
use super::collision;
use super::effects::{ActiveEffects, EffectKind};
use super::geom::Rect;
use super::runner::RunnerPose;
use super::spawner;
use super::state::{GamePhase, GameState, ObstacleKind, TokenKind};
use super::tokens;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump (also starts the run from `Ready`)
    pub jump: bool,
    /// Duck, held
    pub duck: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode: the autopilot plays
    pub idle_mode: bool,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Paused,
    Resumed,
    Jumped,
    ObstaclesSpawned { count: u32, flying: bool },
    TokenSpawned { kind: TokenKind, fallback: bool },
    ObstacleDodged { id: u32 },
    TokenCollected { kind: TokenKind, coins: u64 },
    EffectExpired(EffectKind),
    TierReached(u32),
    AchievementUnlocked(Achievement),
    GameOver { score: u64 },
    /// Emitted by the app layer when a finished run beats the stored best
    NewHighScore(u64),
}

/// What an entity is, for renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Runner,
    Obstacle(ObstacleKind),
    Token(TokenKind),
}

/// Drawable view of one entity (the runner has id 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub rect: Rect,
}

/// Snapshot returned from every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub score: f64,
    pub is_game_over: bool,
    pub phase: GamePhase,
    pub tier: u32,
    pub base_speed: f32,
    pub world_speed: f32,
    pub coins: u64,
    pub active_effects: ActiveEffects,
    pub runner_pose: RunnerPose,
    pub entities: Vec<EntityView>,
    pub events: Vec<GameEvent>,
}

/// Build a snapshot of the current state
pub fn snapshot(state: &GameState, events: Vec<GameEvent>) -> FrameResult {
    let mut entities = Vec::with_capacity(1 + state.obstacles.len() + state.tokens.len());
    entities.push(EntityView {
        id: 0,
        kind: EntityKind::Runner,
        rect: state.runner.hitbox(&state.tuning),
    });
    entities.extend(state.obstacles.iter().map(|o| EntityView {
        id: o.id,
        kind: EntityKind::Obstacle(o.kind),
        rect: o.body.rect(),
    }));
    entities.extend(state.tokens.iter().map(|t| EntityView {
        id: t.id,
        kind: EntityKind::Token(t.kind),
        rect: t.body.rect(),
    }));

    FrameResult {
        score: state.difficulty.score,
        is_game_over: state.is_game_over(),
        phase: state.phase,
        tier: state.difficulty.tier,
        base_speed: state.difficulty.base_speed,
        world_speed: state.difficulty.world_speed,
        coins: state.stats.coins,
        active_effects: state.effects,
        runner_pose: state.runner.pose,
        entities,
        events,
    }
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> FrameResult {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at score {}", state.score_points());
                events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                log::info!("Resumed");
                events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return snapshot(state, events),
        GamePhase::Ready => {
            if !(input.jump || input.idle_mode) {
                return snapshot(state, events);
            }
            state.phase = GamePhase::Running;
            log::info!("Run started (seed {})", state.seed);
            events.push(GameEvent::RunStarted);
        }
        GamePhase::Running => {}
    }

    if !(dt.is_finite() && dt > 0.0) {
        return snapshot(state, events);
    }

    // Runner
    let (jump, duck) = if input.idle_mode {
        autopilot::drive(state)
    } else {
        (input.jump, input.duck)
    };
    if state.runner.update(jump, duck, dt, &state.tuning) {
        events.push(GameEvent::Jumped);
    }

    // Effects wear off before anything moves
    let expired = state.effects.decay(dt);
    if !expired.is_empty() {
        state.difficulty.recompute(&state.tuning.speed, &state.effects);
        for kind in expired {
            log::debug!("Effect expired: {kind:?}");
            events.push(GameEvent::EffectExpired(kind));
        }
    }

    // Spawning
    spawner::update(state, &mut events);
    tokens::update(state, dt, &mut events);

    // Scroll the world
    let dx = state.difficulty.world_speed * dt;
    let runner_x = state.runner.x;
    for obstacle in &mut state.obstacles {
        obstacle.body.advance(dx);
        if !obstacle.dodged && obstacle.body.rect().right() < runner_x {
            obstacle.dodged = true;
            state.stats.obstacles_dodged += 1;
            events.push(GameEvent::ObstacleDodged { id: obstacle.id });
        }
    }
    for token in &mut state.tokens {
        token.body.advance(dx);
    }
    state.obstacles.retain(|o| o.body.active);
    state.tokens.retain(|t| t.body.active);

    // Collisions
    let hitbox = state.runner.hitbox(&state.tuning);
    let report = collision::resolve(
        &hitbox,
        &state.obstacles,
        &mut state.tokens,
        state.effects.invincible(),
    );
    if report.ignored > 0 {
        log::debug!("Passed through {} obstacle(s) while invincible", report.ignored);
    }
    if let Some(id) = report.fatal {
        state.phase = GamePhase::GameOver;
        state.runner.set_idle();
        let score = state.score_points();
        log::info!("Game over: hit obstacle {id} at score {score}");
        events.push(GameEvent::GameOver { score });
        return snapshot(state, events);
    }
    for token in report.collected {
        let coins = tokens::collect(&token, &mut state.effects, &mut state.stats);
        log::debug!("Collected {} token", token.kind.name());
        events.push(GameEvent::TokenCollected {
            kind: token.kind,
            coins,
        });
    }

    // Score and difficulty
    state.difficulty.accrue(dt, &state.tuning.speed);
    if let Some(tier) = state.difficulty.recompute(&state.tuning.speed, &state.effects) {
        log::info!("Reached tier {tier}");
        events.push(GameEvent::TierReached(tier));
    }

    state.stats.elapsed += dt;
    state.time_ticks += 1;

    let progress = Progress {
        score: state.score_points(),
        dodged: state.stats.obstacles_dodged,
        level: state.difficulty.level(&state.tuning.speed),
        speed_multiplier: state.difficulty.speed_multiplier(&state.tuning.speed),
    };
    for achievement in state.stats.achievements.check(&progress) {
        log::info!("Achievement unlocked: {}", achievement.name());
        events.push(GameEvent::AchievementUnlocked(achievement));
    }

    snapshot(state, events)
}
