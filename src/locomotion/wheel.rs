//! Frequency-time wheel: the shared phase every cyclic animation reads.

use std::collections::VecDeque;
use std::f32::consts::PI;

use crate::math::wrap_degrees;

/// Number of increments kept for the running average.
pub const INCREMENT_HISTORY: usize = 8;

/// Rotating phase accumulator, in degrees within `[0, 360)`.
///
/// Walking drives it from ground speed so feet match the surface; every
/// other animation drives it from the animation's own frequency.
#[derive(Clone, Debug)]
pub struct FrequencyTimeWheel {
    position: f32,
    radius: f32,
    recent_increments: VecDeque<f32>,
    average_increment: f32,
    elapsed: f32,
}

impl Default for FrequencyTimeWheel {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTimeWheel {
    pub fn new() -> Self {
        Self {
            position: 0.0,
            radius: 0.0,
            recent_increments: VecDeque::with_capacity(INCREMENT_HISTORY),
            average_increment: 0.0,
            elapsed: 0.0,
        }
    }

    /// Current angle in degrees.
    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Jump to an angle, e.g. to resume a nested transition's phase.
    pub fn set_position(&mut self, degrees: f32) {
        self.position = wrap_degrees(degrees);
    }

    /// Wheel radius used by the last walk advance (stride / pi).
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Mean of the last [`INCREMENT_HISTORY`] applied increments.
    #[inline]
    pub fn average_increment(&self) -> f32 {
        self.average_increment
    }

    /// Seconds accumulated across advances.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Rotate by `degrees`, wrapping into `[0, 360)`.
    pub fn advance(&mut self, degrees: f32) {
        self.position = wrap_degrees(self.position + degrees);
        if self.recent_increments.len() == INCREMENT_HISTORY {
            self.recent_increments.pop_front();
        }
        self.recent_increments.push_back(degrees);
        self.average_increment =
            self.recent_increments.iter().sum::<f32>() / self.recent_increments.len() as f32;
    }

    /// Rotate unless the increment is implausibly large. Returns whether
    /// the wheel moved.
    pub fn advance_limited(&mut self, degrees: f32, max_increment: f32) -> bool {
        if !degrees.is_finite() || degrees.abs() > max_increment {
            log::trace!("wheel increment {:.2} discarded (max {:.2})", degrees, max_increment);
            return false;
        }
        self.advance(degrees);
        true
    }

    /// Advance from ground speed so one stride equals half a revolution.
    ///
    /// Returns the increment applied, or `None` if it was discarded.
    pub fn advance_walk(&mut self, speed: f32, stride_length: f32, delta_time: f32, max_increment: f32) -> Option<f32> {
        self.elapsed += delta_time;
        let increment = walk_increment(speed, stride_length, delta_time)?;
        self.radius = stride_length / PI;
        self.advance_limited(increment, max_increment).then_some(increment)
    }

    /// Advance from an animation frequency in radians per second.
    pub fn advance_frequency(&mut self, frequency: f32, delta_time: f32, max_increment: f32) -> Option<f32> {
        self.elapsed += delta_time;
        let increment = frequency_increment(frequency, delta_time);
        self.advance_limited(increment, max_increment).then_some(increment)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Degrees travelled for `speed` over `delta_time` on a wheel whose
/// half-circumference is one stride.
pub fn walk_increment(speed: f32, stride_length: f32, delta_time: f32) -> Option<f32> {
    if !(stride_length > 0.0) {
        return None;
    }
    let radius = stride_length / PI;
    Some((speed / radius).to_degrees() * delta_time)
}

/// Degrees travelled at `frequency` rad/s over `delta_time`.
#[inline]
pub fn frequency_increment(frequency: f32, delta_time: f32) -> f32 {
    frequency.to_degrees() * delta_time
}
