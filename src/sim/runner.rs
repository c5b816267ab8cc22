//! The runner: jump, duck and gravity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::tuning::Tuning;

/// Visual pose hint for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerPose {
    /// Before the run starts or after it ends
    Idle,
    Run,
    Jump,
    Duck,
}

/// Player-controlled runner. Its x never changes; the world scrolls past.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    /// Left edge
    pub x: f32,
    /// Bottom edge; equals the ground y while grounded
    pub feet_y: f32,
    /// Vertical velocity (negative = up)
    pub vel_y: f32,
    pub grounded: bool,
    pub ducking: bool,
    pub pose: RunnerPose,
}

impl Runner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            x: tuning.world.runner_x,
            feet_y: tuning.world.ground_y,
            vel_y: 0.0,
            grounded: true,
            ducking: false,
            pose: RunnerPose::Idle,
        }
    }

    /// Current hitbox. Ducking lowers the top edge; the feet stay put.
    pub fn hitbox(&self, tuning: &Tuning) -> Rect {
        let height = if self.ducking {
            tuning.runner.duck_height
        } else {
            tuning.runner.height
        };
        Rect::standing_on(self.x, self.feet_y, Vec2::new(tuning.runner.width, height))
    }

    /// Apply one tick of input and physics. Returns true if a jump started.
    ///
    /// Jump only fires from the ground. Duck is a held state, only honored
    /// on the ground, and a jump cancels it.
    pub fn update(&mut self, jump: bool, duck: bool, dt: f32, tuning: &Tuning) -> bool {
        let ground_y = tuning.world.ground_y;
        let mut jumped = false;

        if self.grounded && jump {
            self.vel_y = -tuning.runner.jump_speed;
            self.grounded = false;
            jumped = true;
        }
        self.ducking = self.grounded && duck;

        if !self.grounded {
            self.vel_y += tuning.runner.gravity * dt;
            self.feet_y += self.vel_y * dt;
            if self.feet_y >= ground_y {
                self.feet_y = ground_y;
                self.vel_y = 0.0;
                self.grounded = true;
            }
        }

        self.pose = if !self.grounded {
            RunnerPose::Jump
        } else if self.ducking {
            RunnerPose::Duck
        } else {
            RunnerPose::Run
        };
        jumped
    }

    pub fn set_idle(&mut self) {
        self.pose = RunnerPose::Idle;
    }

    /// Height of the feet above the ground
    pub fn height_above_ground(&self, tuning: &Tuning) -> f32 {
        tuning.world.ground_y - self.feet_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_starts_grounded_and_idle() {
        let tuning = Tuning::default();
        let runner = Runner::new(&tuning);
        assert!(runner.grounded);
        assert_eq!(runner.pose, RunnerPose::Idle);
        assert_eq!(runner.hitbox(&tuning).bottom(), tuning.world.ground_y);
    }

    #[test]
    fn test_jump_arc_lands() {
        let tuning = Tuning::default();
        let mut runner = Runner::new(&tuning);

        assert!(runner.update(true, false, SIM_DT, &tuning));
        assert!(!runner.grounded);
        assert_eq!(runner.pose, RunnerPose::Jump);

        let mut peak: f32 = 0.0;
        let mut ticks = 0;
        while !runner.grounded {
            runner.update(false, false, SIM_DT, &tuning);
            peak = peak.max(runner.height_above_ground(&tuning));
            ticks += 1;
            assert!(ticks < 600, "runner never landed");
        }

        let j = tuning.runner.jump_speed;
        let g = tuning.runner.gravity;
        let apex = j * j / (2.0 * g);
        assert!(peak > apex * 0.9 && peak <= apex * 1.05);
        assert_eq!(runner.feet_y, tuning.world.ground_y);
        assert_eq!(runner.pose, RunnerPose::Run);
    }

    #[test]
    fn test_no_double_jump() {
        let tuning = Tuning::default();
        let mut runner = Runner::new(&tuning);
        runner.update(true, false, SIM_DT, &tuning);
        let vel = runner.vel_y;
        assert!(!runner.update(true, false, SIM_DT, &tuning));
        assert!(runner.vel_y > vel, "gravity only, no second impulse");
    }

    #[test]
    fn test_duck_shrinks_hitbox() {
        let tuning = Tuning::default();
        let mut runner = Runner::new(&tuning);
        runner.update(false, true, SIM_DT, &tuning);
        assert!(runner.ducking);
        assert_eq!(runner.pose, RunnerPose::Duck);

        let hitbox = runner.hitbox(&tuning);
        assert_eq!(hitbox.size.y, tuning.runner.duck_height);
        assert_eq!(hitbox.bottom(), tuning.world.ground_y);

        runner.update(false, false, SIM_DT, &tuning);
        assert!(!runner.ducking, "duck is held, release stands up");
    }

    #[test]
    fn test_duck_ignored_in_air() {
        let tuning = Tuning::default();
        let mut runner = Runner::new(&tuning);
        runner.update(true, true, SIM_DT, &tuning);
        assert!(!runner.ducking);
        runner.update(false, true, SIM_DT, &tuning);
        assert!(!runner.ducking);
    }
}
