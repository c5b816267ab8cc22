//! Runner vs. entity collision
//!
//! Obstacles are checked before tokens. A fatal obstacle hit returns
//! immediately, so a token overlapped in the same tick is not collected.

use super::geom::Rect;
use super::state::{Obstacle, Token};

/// Outcome of one collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Obstacle that ended the run
    pub fatal: Option<u32>,
    /// Tokens overlapped this tick, removed from the token list
    pub collected: Vec<Token>,
    /// Obstacles passed through while invincible
    pub ignored: u32,
}

/// First active obstacle overlapping `hitbox`
pub fn first_obstacle_hit<'a>(hitbox: &Rect, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .filter(|o| o.body.active)
        .find(|o| o.body.rect().intersects(hitbox))
}

/// Resolve collisions for one tick.
///
/// With `invincible` set obstacle overlaps are ignored entirely. Collected
/// tokens are drained from `tokens` and returned for the caller to apply.
pub fn resolve(
    hitbox: &Rect,
    obstacles: &[Obstacle],
    tokens: &mut Vec<Token>,
    invincible: bool,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    if invincible {
        report.ignored = obstacles
            .iter()
            .filter(|o| o.body.active && o.body.rect().intersects(hitbox))
            .count() as u32;
    } else if let Some(hit) = first_obstacle_hit(hitbox, obstacles) {
        report.fatal = Some(hit.id);
        return report;
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.body.active && token.body.rect().intersects(hitbox) {
            report.collected.push(tokens.remove(i));
        } else {
            i += 1;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::runner::Runner;
    use crate::sim::state::{AltitudeLane, Body, ObstacleKind, TokenKind};
    use crate::tuning::Tuning;

    fn obstacle(id: u32, kind: ObstacleKind, x: f32) -> Obstacle {
        Obstacle {
            id,
            kind,
            body: Body::new(kind.rect_at(x, 540.0)),
            dodged: false,
        }
    }

    fn token(id: u32, rect: Rect) -> Token {
        Token {
            id,
            kind: TokenKind::Coin,
            body: Body::new(rect),
            value: 1.0,
            duration: 0.0,
        }
    }

    fn runner_box(ducking: bool) -> Rect {
        let tuning = Tuning::default();
        let mut runner = Runner::new(&tuning);
        runner.ducking = ducking;
        runner.hitbox(&tuning)
    }

    #[test]
    fn test_overlap_is_fatal() {
        let obstacles = vec![obstacle(1, ObstacleKind::Rock, 170.0)];
        let mut tokens = Vec::new();
        let report = resolve(&runner_box(false), &obstacles, &mut tokens, false);
        assert_eq!(report.fatal, Some(1));
    }

    #[test]
    fn test_invincible_ignores_obstacles() {
        let obstacles = vec![obstacle(1, ObstacleKind::Rock, 170.0)];
        let mut tokens = Vec::new();
        let report = resolve(&runner_box(false), &obstacles, &mut tokens, true);
        assert_eq!(report.fatal, None);
        assert_eq!(report.ignored, 1);
    }

    #[test]
    fn test_obstacle_checked_before_token() {
        let hitbox = runner_box(false);
        let obstacles = vec![obstacle(1, ObstacleKind::Barrel, 170.0)];
        let mut tokens = vec![token(2, Rect::new(160.0, 460.0, 32.0, 32.0))];
        let report = resolve(&hitbox, &obstacles, &mut tokens, false);
        assert_eq!(report.fatal, Some(1));
        assert!(report.collected.is_empty());
        assert_eq!(tokens.len(), 1, "token survives a fatal tick");
    }

    #[test]
    fn test_token_collected_and_removed() {
        let hitbox = runner_box(false);
        let mut tokens = vec![
            token(1, Rect::new(160.0, 460.0, 32.0, 32.0)),
            token(2, Rect::new(800.0, 460.0, 32.0, 32.0)),
        ];
        let report = resolve(&hitbox, &[], &mut tokens, false);
        assert_eq!(report.collected.len(), 1);
        assert_eq!(report.collected[0].id, 1);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].id, 2);
    }

    #[test]
    fn test_duck_clears_low_flyer() {
        let low = vec![obstacle(
            1,
            ObstacleKind::Bird {
                lane: AltitudeLane::Low,
            },
            170.0,
        )];
        let mut tokens = Vec::new();
        assert!(resolve(&runner_box(false), &low, &mut tokens, false).fatal.is_some());
        assert!(resolve(&runner_box(true), &low, &mut tokens, false).fatal.is_none());
    }

    #[test]
    fn test_high_flyer_clears_standing_runner() {
        let high = vec![obstacle(
            1,
            ObstacleKind::Bird {
                lane: AltitudeLane::High,
            },
            170.0,
        )];
        let mut tokens = Vec::new();
        assert!(resolve(&runner_box(false), &high, &mut tokens, false).fatal.is_none());
    }

    #[test]
    fn test_inactive_entities_ignored() {
        let mut obstacles = vec![obstacle(1, ObstacleKind::Rock, 170.0)];
        obstacles[0].body.active = false;
        let mut tokens = Vec::new();
        assert!(resolve(&runner_box(false), &obstacles, &mut tokens, false).fatal.is_none());
    }
}
