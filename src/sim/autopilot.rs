//! Demo mode controller
//!
//! Jumps ground obstacles and ducks low flyers. It reads the same state a
//! player sees and produces ordinary jump/duck input, so a demo run obeys
//! the same rules as a real one.

use super::state::{AltitudeLane, GameState, ObstacleKind};
use crate::consts::SIM_DT;

/// Look-ahead window for grouping ground obstacles into one jump (px)
const CLUSTER_WINDOW: f32 = 300.0;

/// How early to start ducking under a low flyer (seconds)
const DUCK_LEAD: f32 = 0.3;

/// Time for a jump to lift the feet `height` px off the ground
fn rise_time(height: f32, jump_speed: f32, gravity: f32) -> f32 {
    let disc = jump_speed * jump_speed - 2.0 * gravity * height;
    if disc <= 0.0 {
        return jump_speed / gravity;
    }
    (jump_speed - disc.sqrt()) / gravity
}

/// Decide `(jump, duck)` for the current tick
pub fn drive(state: &GameState) -> (bool, bool) {
    let tuning = &state.tuning;
    let runner = &state.runner;
    if !runner.grounded {
        return (false, false);
    }

    let hitbox = runner.hitbox(tuning);
    let speed = state.difficulty.world_speed.max(1.0);
    let ahead = state
        .obstacles
        .iter()
        .filter(|o| o.body.active && o.body.rect().right() > hitbox.left());

    let mut nearest_ground: Option<f32> = None;
    let mut duck = false;
    for o in ahead.clone() {
        let distance = o.body.rect().left() - hitbox.right();
        match o.kind {
            ObstacleKind::Bird {
                lane: AltitudeLane::Low,
            } => duck |= distance <= speed * DUCK_LEAD,
            ObstacleKind::Bird {
                lane: AltitudeLane::High,
            } => {}
            _ => {
                nearest_ground = Some(nearest_ground.map_or(distance, |d| d.min(distance)));
            }
        }
    }

    let Some(distance) = nearest_ground else {
        return (false, duck);
    };

    // Clear the tallest obstacle in the cluster about to arrive
    let height = ahead
        .filter(|o| !o.kind.is_flying())
        .filter(|o| o.body.rect().left() - hitbox.right() <= distance + CLUSTER_WINDOW)
        .map(|o| o.kind.height())
        .fold(0.0, f32::max);
    let t_rise = rise_time(height, tuning.runner.jump_speed, tuning.runner.gravity);

    let jump = distance <= speed * (t_rise + SIM_DT);
    (jump, duck && !jump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_rise_time() {
        let t = rise_time(0.0, 1500.0, 4500.0);
        assert_eq!(t, 0.0);
        let t = rise_time(80.0, 1500.0, 4500.0);
        assert!(t > 0.0 && t < 0.1);
        assert_eq!(rise_time(1e6, 1500.0, 4500.0), 1500.0 / 4500.0);
    }

    #[test]
    fn test_idle_on_empty_track() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(drive(&state), (false, false));
    }

    #[test]
    fn test_jumps_close_ground_obstacle() {
        let mut state = GameState::new(1, Tuning::default());
        let x = state.tuning.world.runner_x + state.tuning.runner.width + 5.0;
        state.push_obstacle(ObstacleKind::Barrel, x);
        assert_eq!(drive(&state), (true, false));
    }

    #[test]
    fn test_waits_for_far_obstacle() {
        let mut state = GameState::new(1, Tuning::default());
        state.push_obstacle(ObstacleKind::Rock, 1000.0);
        assert_eq!(drive(&state), (false, false));
    }

    #[test]
    fn test_ducks_low_flyer() {
        let mut state = GameState::new(1, Tuning::default());
        let x = state.tuning.world.runner_x + state.tuning.runner.width + 20.0;
        state.push_obstacle(
            ObstacleKind::Bird {
                lane: AltitudeLane::Low,
            },
            x,
        );
        assert_eq!(drive(&state), (false, true));
    }

    #[test]
    fn test_ignores_high_flyer() {
        let mut state = GameState::new(1, Tuning::default());
        let x = state.tuning.world.runner_x + state.tuning.runner.width + 20.0;
        state.push_obstacle(
            ObstacleKind::Bird {
                lane: AltitudeLane::High,
            },
            x,
        );
        assert_eq!(drive(&state), (false, false));
    }
}
