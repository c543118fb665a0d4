//! Body lean from forward speed and turn rate.

use super::state::{Direction, LocomotionState, MotionState};
use crate::animation::Calibration;
use crate::filters::{ButterworthFilter, CubicEase};

/// Log-speed range mapped onto roll progress.
const ROLL_SPEED_DECADES: f32 = 8.0;

/// Lean angles in degrees. Pitch is about x, roll about z.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lean {
    pub pitch: f32,
    pub roll: f32,
}

/// Smoothing state for lean. Each axis has its own filter.
#[derive(Clone, Debug)]
pub struct LeanFilters {
    pitch: ButterworthFilter,
    roll: ButterworthFilter,
    roll_curve: CubicEase,
}

impl Default for LeanFilters {
    fn default() -> Self {
        Self::new()
    }
}

impl LeanFilters {
    pub fn new() -> Self {
        Self {
            pitch: ButterworthFilter::new(),
            roll: ButterworthFilter::new(),
            roll_curve: CubicEase::EASE_IN_CUBIC,
        }
    }

    /// Filter this tick's lean. Both filters are fed every tick, with zero
    /// while static, so they settle back smoothly.
    pub fn update(&mut self, motion: &MotionState, calibration: &Calibration, top_speed: f32) -> Lean {
        let moving = motion.state != LocomotionState::Static && top_speed > 0.0;

        let pitch_input = match motion.direction {
            Direction::Down | Direction::Forwards | Direction::Backwards if moving => {
                (-motion.velocity.z / top_speed).clamp(-1.0, 1.0)
            }
            _ => 0.0,
        };

        let roll_input = if moving && calibration.delta_yaw_max > 0.0 {
            let speed = motion.speed();
            let speed_term = if speed > 0.0 {
                (((speed / top_speed).ln() + ROLL_SPEED_DECADES) / ROLL_SPEED_DECADES).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let turn_term = (motion.yaw_delta.abs() / calibration.delta_yaw_max).min(1.0);

            let mut sign = motion.yaw_delta.signum();
            if matches!(motion.direction, Direction::Backwards | Direction::Left) {
                sign = -sign;
            }
            self.roll_curve.apply_signed(sign * speed_term * turn_term)
        } else {
            0.0
        };

        Lean {
            pitch: self.pitch.process(pitch_input) * calibration.pitch_max,
            roll: self.roll.process(roll_input) * calibration.roll_max,
        }
    }

    pub fn reset(&mut self) {
        self.pitch.reset();
        self.roll.reset();
    }
}
