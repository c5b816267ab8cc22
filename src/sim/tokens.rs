//! Coin and powerup tokens
//!
//! Tokens run on two timers independent of the obstacle spawner: coins on a
//! tier-scaled interval, powerups on their own interval gated by score and
//! probability. Placement is validated against the current obstacles so a
//! token never appears inside one.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::ActiveEffects;
use super::geom::Rect;
use super::state::{Body, GameState, Obstacle, RunStats, Token, TokenKind};
use super::tick::GameEvent;
use crate::tuning::{TokenTuning, Tuning};

/// Countdown state for both token timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTimers {
    pub coin_elapsed: f32,
    pub next_coin: f32,
    pub powerup_elapsed: f32,
    pub next_powerup: f32,
}

impl TokenTimers {
    pub fn new(rng: &mut Pcg32, tuning: &Tuning) -> Self {
        Self {
            coin_elapsed: 0.0,
            next_coin: coin_interval(rng, 0, &tuning.tokens),
            powerup_elapsed: 0.0,
            next_powerup: powerup_interval(rng, &tuning.tokens),
        }
    }
}

fn roll(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Coin interval for a tier: the base roll scaled by
/// `max(floor, 1 - step * tier)`
pub fn coin_interval(rng: &mut Pcg32, tier: u32, t: &TokenTuning) -> f32 {
    let scale = (1.0 - t.coin_interval_tier_step * tier as f32).max(t.coin_interval_floor);
    roll(rng, t.coin_interval_min, t.coin_interval_max) * scale
}

fn powerup_interval(rng: &mut Pcg32, t: &TokenTuning) -> f32 {
    roll(rng, t.powerup_interval_min, t.powerup_interval_max)
}

/// Build the eligible powerup set for `score` and pick one uniformly
pub fn choose_powerup(rng: &mut Pcg32, score: f64, t: &TokenTuning) -> Option<TokenKind> {
    let mut eligible = Vec::with_capacity(3);
    if rng.random_bool(t.multiplier_probability) {
        eligible.push(TokenKind::ScoreMultiplier);
    }
    if score >= t.slow_min_score {
        eligible.push(TokenKind::SlowWorld);
    }
    if score > t.invincibility_min_score && rng.random_bool(t.invincibility_probability) {
        eligible.push(TokenKind::Invincibility);
    }

    if eligible.is_empty() {
        None
    } else {
        Some(eligible[rng.random_range(0..eligible.len())])
    }
}

/// Value and duration carried by a freshly spawned token
pub fn token_payload(kind: TokenKind, t: &TokenTuning) -> (f32, f32) {
    match kind {
        TokenKind::Coin => (t.coin_value as f32, 0.0),
        TokenKind::ScoreMultiplier => (t.multiplier_value, t.multiplier_duration),
        TokenKind::SlowWorld => (t.slow_factor, t.slow_duration),
        TokenKind::Invincibility => (1.0, t.invincibility_duration),
    }
}

/// Find a token position clear of every obstacle.
///
/// Candidates sit past the right edge at one of the configured altitudes and
/// are rejected if they overlap an obstacle inflated by the safety margin.
/// After `max_placement_attempts` rejections the token goes to the fallback
/// lane above the tallest obstacle profile. Returns the top-left corner and
/// whether the fallback was used.
pub fn find_spawn_position(
    rng: &mut Pcg32,
    obstacles: &[Obstacle],
    tuning: &Tuning,
) -> (Vec2, bool) {
    let t = &tuning.tokens;
    let w = &tuning.world;
    let size = Vec2::splat(t.size);

    for _ in 0..t.max_placement_attempts {
        let x = w.viewport_width + roll(rng, t.spawn_offset_min, t.spawn_offset_max);
        let altitude = t.altitudes[rng.random_range(0..t.altitudes.len())];
        let rect = Rect::centered(Vec2::new(x + t.size / 2.0, w.ground_y - altitude), size);

        let blocked = obstacles
            .iter()
            .filter(|o| o.body.active)
            .any(|o| o.body.rect().inflate(t.safety_margin).intersects(&rect));
        if !blocked {
            return (rect.min, false);
        }
    }

    let fallback = Vec2::new(w.viewport_width + t.spawn_offset_min, tuning.token_fallback_y());
    (fallback, true)
}

/// Apply a collected token. Returns the coins it added.
pub fn collect(token: &Token, effects: &mut ActiveEffects, stats: &mut RunStats) -> u64 {
    stats.tokens_collected += 1;
    match token.kind.effect() {
        None => {
            let coins = (token.value * effects.coin_multiplier()).round().max(0.0) as u64;
            stats.coins += coins;
            coins
        }
        Some(effect) => {
            effects.activate(effect, token.duration, token.value);
            0
        }
    }
}

fn spawn(state: &mut GameState, kind: TokenKind, events: &mut Vec<GameEvent>) {
    let (pos, fallback) = find_spawn_position(&mut state.rng, &state.obstacles, &state.tuning);
    let (value, duration) = token_payload(kind, &state.tuning.tokens);
    let size = Vec2::splat(state.tuning.tokens.size);
    let id = state.next_entity_id();
    state.tokens.push(Token {
        id,
        kind,
        body: Body::new(Rect { min: pos, size }),
        value,
        duration,
    });
    if fallback {
        log::debug!("Token {} placed in fallback lane", kind.name());
    } else {
        log::debug!("Spawned {} token at ({:.0}, {:.0})", kind.name(), pos.x, pos.y);
    }
    events.push(GameEvent::TokenSpawned { kind, fallback });
}

/// Advance both timers and spawn whatever comes due
pub fn update(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    state.token_timers.coin_elapsed += dt;
    if state.token_timers.coin_elapsed >= state.token_timers.next_coin {
        state.token_timers.coin_elapsed = 0.0;
        state.token_timers.next_coin =
            coin_interval(&mut state.rng, state.difficulty.tier, &state.tuning.tokens);
        spawn(state, TokenKind::Coin, events);
    }

    state.token_timers.powerup_elapsed += dt;
    if state.token_timers.powerup_elapsed >= state.token_timers.next_powerup {
        state.token_timers.powerup_elapsed = 0.0;
        state.token_timers.next_powerup = powerup_interval(&mut state.rng, &state.tuning.tokens);
        let choice = choose_powerup(&mut state.rng, state.difficulty.score, &state.tuning.tokens);
        match choice {
            Some(kind) => spawn(state, kind, events),
            None => log::debug!("No powerup eligible at score {:.0}", state.difficulty.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;
    use crate::sim::state::{AltitudeLane, ObstacleKind};
    use rand::SeedableRng;

    fn dense_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default());
        let mut x = state.tuning.world.viewport_width;
        let kinds = [
            ObstacleKind::Barrel,
            ObstacleKind::Bird {
                lane: AltitudeLane::High,
            },
            ObstacleKind::Stump,
            ObstacleKind::Bird {
                lane: AltitudeLane::Low,
            },
            ObstacleKind::Rock,
        ];
        while x < state.tuning.world.viewport_width + 600.0 {
            for kind in kinds {
                state.push_obstacle(kind, x);
                x += kind.width() * 0.6;
            }
        }
        state
    }

    #[test]
    fn test_spawn_never_overlaps_inflated_obstacles() {
        let mut state = dense_state(11);
        let tuning = state.tuning.clone();
        let margin = tuning.tokens.safety_margin;
        let size = Vec2::splat(tuning.tokens.size);
        let mut fallbacks = 0;

        for _ in 0..1000 {
            let (pos, fallback) = find_spawn_position(&mut state.rng, &state.obstacles, &tuning);
            fallbacks += fallback as u32;
            let rect = Rect { min: pos, size };
            for o in &state.obstacles {
                assert!(
                    !o.body.rect().inflate(margin).intersects(&rect),
                    "token at {pos:?} overlaps {:?}",
                    o.kind
                );
            }
            assert!(rect.top() >= 0.0);
        }
        assert!(fallbacks > 0, "dense layout should force the fallback lane");
    }

    #[test]
    fn test_open_field_uses_configured_altitudes() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(12);
        for _ in 0..100 {
            let (pos, fallback) = find_spawn_position(&mut rng, &[], &tuning);
            assert!(!fallback);
            let center_y = pos.y + tuning.tokens.size / 2.0;
            let altitude = tuning.world.ground_y - center_y;
            assert!(tuning.tokens.altitudes.iter().any(|a| (a - altitude).abs() < 1e-3));
            assert!(pos.x >= tuning.world.viewport_width + tuning.tokens.spawn_offset_min);
        }
    }

    #[test]
    fn test_coin_interval_shrinks_with_tier() {
        let t = TokenTuning::default();
        let mut a = Pcg32::seed_from_u64(13);
        let mut b = Pcg32::seed_from_u64(13);
        let base = coin_interval(&mut a, 0, &t);
        let fast = coin_interval(&mut b, 2, &t);
        assert!((fast - base * 0.6).abs() < 1e-4);

        let mut c = Pcg32::seed_from_u64(13);
        let floored = coin_interval(&mut c, 100, &t);
        assert!((floored - base * t.coin_interval_floor).abs() < 1e-4);
    }

    #[test]
    fn test_powerup_eligibility_by_score() {
        let t = TokenTuning::default();
        let mut rng = Pcg32::seed_from_u64(14);
        for _ in 0..500 {
            match choose_powerup(&mut rng, 0.0, &t) {
                None | Some(TokenKind::ScoreMultiplier) => {}
                other => panic!("ineligible powerup {other:?} at score 0"),
            }
        }

        let mut seen_invincible = false;
        for _ in 0..500 {
            let choice = choose_powerup(&mut rng, t.invincibility_min_score + 1.0, &t);
            assert!(choice.is_some(), "slow-world is always eligible here");
            seen_invincible |= choice == Some(TokenKind::Invincibility);
        }
        assert!(seen_invincible);
    }

    #[test]
    fn test_invincibility_needs_score_above_threshold() {
        let t = TokenTuning::default();
        let mut rng = Pcg32::seed_from_u64(15);
        for _ in 0..500 {
            let choice = choose_powerup(&mut rng, t.invincibility_min_score, &t);
            assert_ne!(choice, Some(TokenKind::Invincibility));
        }
    }

    #[test]
    fn test_collect_coin_uses_multiplier() {
        let t = TokenTuning::default();
        let mut effects = ActiveEffects::default();
        let mut stats = RunStats::default();
        let (value, duration) = token_payload(TokenKind::Coin, &t);
        let coin = Token {
            id: 1,
            kind: TokenKind::Coin,
            body: Body::new(Rect::new(0.0, 0.0, 32.0, 32.0)),
            value,
            duration,
        };

        assert_eq!(collect(&coin, &mut effects, &mut stats), 1);
        effects.activate(EffectKind::ScoreMultiplier, 10.0, 2.0);
        assert_eq!(collect(&coin, &mut effects, &mut stats), 2);
        assert_eq!(stats.coins, 3);
        assert_eq!(stats.tokens_collected, 2);
    }

    #[test]
    fn test_collect_powerup_activates_effect() {
        let t = TokenTuning::default();
        let mut effects = ActiveEffects::default();
        let mut stats = RunStats::default();
        let (value, duration) = token_payload(TokenKind::SlowWorld, &t);
        let token = Token {
            id: 1,
            kind: TokenKind::SlowWorld,
            body: Body::new(Rect::new(0.0, 0.0, 32.0, 32.0)),
            value,
            duration,
        };
        assert_eq!(collect(&token, &mut effects, &mut stats), 0);
        assert_eq!(effects.slow_factor(), t.slow_factor);
        assert_eq!(effects.remaining(EffectKind::SlowWorld), t.slow_duration);
        assert_eq!(stats.coins, 0);
    }

    #[test]
    fn test_update_spawns_coin_when_due() {
        let mut state = GameState::new(16, Tuning::default());
        let due = state.token_timers.next_coin;
        let mut events = Vec::new();
        update(&mut state, due, &mut events);
        assert!(state.tokens.iter().any(|t| t.kind == TokenKind::Coin));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::TokenSpawned {
                kind: TokenKind::Coin,
                ..
            }
        )));
        assert_eq!(state.token_timers.coin_elapsed, 0.0);
    }
}
