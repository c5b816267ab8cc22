//! Obstacle group spawning
//!
//! A new group is spawned once the most recent obstacle has scrolled far
//! enough left to open a gap of `next_gap` pixels before the right edge of
//! the viewport. The gap is world-space, so faster scrolling spawns sooner
//! in wall-clock time without any extra scaling.
//!
//! Tokens already waiting past the right edge keep their place: a group is
//! pushed right until it clears every token's safety zone.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::state::{AltitudeLane, GameState, Obstacle, ObstacleKind};
use super::tick::GameEvent;
use crate::tuning::Tuning;

/// Gap bookkeeping between obstacle groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    /// Horizontal gap required before the next group (px)
    pub next_gap: f32,
}

impl Spawner {
    pub fn new(rng: &mut Pcg32, tuning: &Tuning) -> Self {
        Self {
            next_gap: roll_gap(rng, tuning),
        }
    }

    /// An empty obstacle list always spawns; otherwise the last obstacle's
    /// right edge must be `next_gap` clear of the viewport edge.
    pub fn should_spawn(&self, obstacles: &[Obstacle], viewport_width: f32) -> bool {
        match obstacles.last() {
            None => true,
            Some(last) => last.body.rect().right() + self.next_gap <= viewport_width,
        }
    }
}

fn roll_gap(rng: &mut Pcg32, tuning: &Tuning) -> f32 {
    let s = &tuning.spawn;
    if s.gap_max > s.gap_min {
        rng.random_range(s.gap_min..=s.gap_max)
    } else {
        s.gap_min
    }
}

/// Pick the kinds for one group.
///
/// Below max tier: `1..=tier+1` independently chosen ground kinds. At max
/// tier the decision first rolls `flying_probability` for a single flyer in
/// a random lane, falling back to a ground group.
pub fn choose_group(rng: &mut Pcg32, tier: u32, tuning: &Tuning) -> Vec<ObstacleKind> {
    if tier >= tuning.speed.max_tier && rng.random_bool(tuning.spawn.flying_probability) {
        let lane = AltitudeLane::ALL[rng.random_range(0..AltitudeLane::ALL.len())];
        return vec![ObstacleKind::Bird { lane }];
    }

    let count = rng.random_range(1..=tier + 1);
    (0..count)
        .map(|_| ObstacleKind::GROUND[rng.random_range(0..ObstacleKind::GROUND.len())])
        .collect()
}

/// Left edge of each obstacle in a group starting at `x`
fn layout(group: &[ObstacleKind], mut x: f32, spacing: f32) -> Vec<f32> {
    group
        .iter()
        .map(|kind| {
            let left = x;
            x += kind.width() * spacing;
            left
        })
        .collect()
}

/// Leftmost start at or past `from` where no obstacle of the group touches
/// a token inflated by the safety margin
fn clear_start(state: &GameState, group: &[ObstacleKind], from: f32) -> f32 {
    let spacing = state.tuning.spawn.cluster_spacing;
    let ground_y = state.tuning.world.ground_y;
    let margin = state.tuning.tokens.safety_margin;
    let zones: Vec<Rect> = state
        .tokens
        .iter()
        .filter(|t| t.body.active)
        .map(|t| t.body.rect().inflate(margin))
        .collect();

    let mut x = from;
    // Every pass clears at least one zone for good, so this ends
    loop {
        let rects: Vec<Rect> = group
            .iter()
            .zip(layout(group, x, spacing))
            .map(|(kind, left)| kind.rect_at(left, ground_y))
            .collect();
        let blocked = zones
            .iter()
            .filter(|zone| rects.iter().any(|r| r.intersects(zone)))
            .map(|zone| zone.right())
            .reduce(f32::max);
        match blocked {
            Some(right) if right > x => x = right,
            _ => return x,
        }
    }
}

/// Spawn a group if the gap allows it
pub fn update(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let viewport_width = state.tuning.world.viewport_width;
    if !state.spawner.should_spawn(&state.obstacles, viewport_width) {
        return;
    }

    let group = choose_group(&mut state.rng, state.difficulty.tier, &state.tuning);
    let start = clear_start(state, &group, viewport_width);
    if start > viewport_width {
        log::debug!("Group pushed {:.0}px right to clear tokens", start - viewport_width);
    }
    let spacing = state.tuning.spawn.cluster_spacing;
    for (&kind, x) in group.iter().zip(layout(&group, start, spacing)) {
        state.push_obstacle(kind, x);
    }

    let flying = group.iter().any(|k| k.is_flying());
    log::debug!(
        "Spawned {} obstacle(s) at tier {} (flying: {})",
        group.len(),
        state.difficulty.tier,
        flying
    );
    events.push(GameEvent::ObstaclesSpawned {
        count: group.len() as u32,
        flying,
    });

    state.spawner.next_gap = roll_gap(&mut state.rng, &state.tuning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Body, Token, TokenKind};
    use rand::SeedableRng;

    #[test]
    fn test_bootstrap_spawns_on_first_tick() {
        let mut state = GameState::new(1, Tuning::default());
        assert_eq!(state.difficulty.score, 0.0);
        let mut events = Vec::new();
        update(&mut state, &mut events);
        assert!(!state.obstacles.is_empty());
        assert!(matches!(
            events.as_slice(),
            [GameEvent::ObstaclesSpawned { .. }]
        ));
    }

    #[test]
    fn test_waits_for_gap() {
        let mut state = GameState::new(2, Tuning::default());
        let mut events = Vec::new();
        update(&mut state, &mut events);
        let count = state.obstacles.len();

        update(&mut state, &mut events);
        assert_eq!(state.obstacles.len(), count, "gap not yet open");

        let vw = state.tuning.world.viewport_width;
        let gap = state.spawner.next_gap;
        let right = state.obstacles.last().map(|o| o.body.rect().right()).unwrap();
        let shift = right + gap - vw + 1.0;
        for o in &mut state.obstacles {
            o.body.advance(shift);
        }
        update(&mut state, &mut events);
        assert!(state.obstacles.len() > count);
    }

    #[test]
    fn test_gap_in_range() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let gap = roll_gap(&mut rng, &tuning);
            assert!(gap >= tuning.spawn.gap_min && gap <= tuning.spawn.gap_max);
        }
    }

    #[test]
    fn test_group_size_bounded_by_tier() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(4);
        for tier in 0..tuning.speed.max_tier {
            let mut seen_max = false;
            for _ in 0..500 {
                let group = choose_group(&mut rng, tier, &tuning);
                assert!(!group.is_empty() && group.len() <= tier as usize + 1);
                seen_max |= group.len() == tier as usize + 1;
            }
            assert!(seen_max);
        }
    }

    #[test]
    fn test_no_flyers_below_max_tier() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        for tier in 0..tuning.speed.max_tier {
            for _ in 0..1000 {
                let group = choose_group(&mut rng, tier, &tuning);
                assert!(group.iter().all(|k| !k.is_flying()));
            }
        }
    }

    #[test]
    fn test_flying_frequency_at_max_tier() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let trials = 1000;
        let mut flying = 0;
        let mut lanes = [0; 2];
        for _ in 0..trials {
            let group = choose_group(&mut rng, tuning.speed.max_tier, &tuning);
            if let [ObstacleKind::Bird { lane }] = group.as_slice() {
                flying += 1;
                lanes[if *lane == AltitudeLane::Low { 0 } else { 1 }] += 1;
            } else {
                assert!(group.iter().all(|k| !k.is_flying()));
            }
        }
        let freq = flying as f64 / trials as f64;
        assert!(
            (freq - tuning.spawn.flying_probability).abs() < 0.06,
            "flying frequency {freq}"
        );
        assert!(lanes[0] > 0 && lanes[1] > 0, "both lanes used");
    }

    #[test]
    fn test_group_is_contiguous_without_overlap() {
        let mut tuning = Tuning::default();
        tuning.spawn.flying_probability = 0.0;
        let mut state = GameState::new(7, tuning);
        state.difficulty.tier = state.tuning.speed.max_tier;

        for _ in 0..50 {
            state.obstacles.clear();
            let mut events = Vec::new();
            update(&mut state, &mut events);
            for pair in state.obstacles.windows(2) {
                let (a, b) = (pair[0].body.rect(), pair[1].body.rect());
                assert!(!a.intersects(&b));
                assert!(b.left() >= a.right());
            }
        }
    }

    #[test]
    fn test_group_starts_past_waiting_token() {
        let mut state = GameState::new(8, Tuning::default());
        let vw = state.tuning.world.viewport_width;
        let ground_y = state.tuning.world.ground_y;
        let margin = state.tuning.tokens.safety_margin;
        let id = state.next_entity_id();
        state.tokens.push(Token {
            id,
            kind: TokenKind::Coin,
            body: Body::new(Rect::new(vw + 20.0, ground_y - 66.0, 32.0, 32.0)),
            value: 1.0,
            duration: 0.0,
        });

        let mut events = Vec::new();
        update(&mut state, &mut events);
        let zone = state.tokens[0].body.rect().inflate(margin);
        assert!(!state.obstacles.is_empty());
        for o in &state.obstacles {
            assert!(!o.body.rect().intersects(&zone), "{:?} inside token zone", o.kind);
        }
        assert!(state.obstacles[0].body.rect().left() >= zone.right());
    }

    #[test]
    fn test_clear_start_ignores_tokens_out_of_reach() {
        let mut state = GameState::new(9, Tuning::default());
        let vw = state.tuning.world.viewport_width;
        let fallback_y = state.tuning.token_fallback_y();
        let id = state.next_entity_id();
        state.tokens.push(Token {
            id,
            kind: TokenKind::Coin,
            body: Body::new(Rect::new(vw, fallback_y, 32.0, 32.0)),
            value: 1.0,
            duration: 0.0,
        });
        let group = [ObstacleKind::Stump, ObstacleKind::Rock];
        assert_eq!(clear_start(&state, &group, vw), vw);
    }

    #[test]
    fn test_obstacles_fit_viewport_height() {
        let tuning = Tuning::default();
        let kinds = ObstacleKind::GROUND.into_iter().chain(
            AltitudeLane::ALL
                .into_iter()
                .map(|lane| ObstacleKind::Bird { lane }),
        );
        for kind in kinds {
            let rect = kind.rect_at(tuning.world.viewport_width, tuning.world.ground_y);
            assert!(rect.top() >= 0.0);
            assert!(rect.bottom() <= tuning.world.viewport_height);
        }
    }
}
