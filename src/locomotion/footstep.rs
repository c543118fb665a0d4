//! Footstep triggers from the walk wheel.

use super::config::FootstepConfig;

/// Wheel band in which the right foot strikes.
const RIGHT_STRIKE: std::ops::Range<f32> = 90.0..270.0;
/// Wheel angle past which the left foot strikes.
const LEFT_STRIKE: f32 = 270.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    #[inline]
    pub fn other(self) -> Foot {
        match self {
            Foot::Left => Foot::Right,
            Foot::Right => Foot::Left,
        }
    }
}

/// Request to play a footstep sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footstep {
    pub foot: Foot,
    /// Playback volume in `[0, 1]`.
    pub volume: f32,
}

/// Alternates feet as the wheel passes each strike angle.
#[derive(Clone, Debug)]
pub struct FootstepTracker {
    next_foot: Foot,
}

impl Default for FootstepTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FootstepTracker {
    pub fn new() -> Self {
        Self { next_foot: Foot::Right }
    }

    #[inline]
    pub fn next_foot(&self) -> Foot {
        self.next_foot
    }

    /// Start the next walk on the right foot.
    pub fn restart(&mut self) {
        self.next_foot = Foot::Right;
    }

    /// Footstep for this wheel position, if the pending foot has reached its
    /// strike angle.
    pub fn check(&mut self, wheel: f32, speed: f32, max_walk_speed: f32, config: &FootstepConfig) -> Option<Footstep> {
        let strikes = match self.next_foot {
            Foot::Right => RIGHT_STRIKE.contains(&wheel),
            Foot::Left => wheel > LEFT_STRIKE,
        };
        if !strikes {
            return None;
        }

        let foot = self.next_foot;
        self.next_foot = foot.other();
        Some(Footstep {
            foot,
            volume: footstep_volume(speed, max_walk_speed, config),
        })
    }
}

/// Louder when walking faster; a fixed floor when shuffling.
pub fn footstep_volume(speed: f32, max_walk_speed: f32, config: &FootstepConfig) -> f32 {
    let volume = if speed > config.speed_threshold && max_walk_speed > 0.0 {
        config.volume_attenuation * speed / max_walk_speed
    } else {
        config.min_volume
    };
    volume.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_alternate_over_a_cycle() {
        let config = FootstepConfig::default();
        let mut tracker = FootstepTracker::new();
        let mut steps = Vec::new();
        let mut wheel = 0.0;
        for _ in 0..72 {
            wheel = (wheel + 10.0) % 360.0;
            if let Some(step) = tracker.check(wheel, 2.0, 2.9, &config) {
                steps.push((wheel, step.foot));
            }
        }
        // Two full cycles, one strike per foot each
        assert_eq!(
            steps,
            vec![(90.0, Foot::Right), (280.0, Foot::Left), (90.0, Foot::Right), (280.0, Foot::Left)]
        );
    }

    #[test]
    fn test_volume() {
        let config = FootstepConfig::default();
        assert_eq!(footstep_volume(0.2, 2.9, &config), 0.5);
        assert!((footstep_volume(2.9, 2.9, &config) - 0.8).abs() < 1e-6);
        assert_eq!(footstep_volume(10.0, 2.9, &config), 1.0);
    }

    #[test]
    fn test_restart_returns_to_right() {
        let config = FootstepConfig::default();
        let mut tracker = FootstepTracker::new();
        tracker.check(100.0, 1.0, 2.9, &config);
        assert_eq!(tracker.next_foot(), Foot::Left);
        tracker.restart();
        assert_eq!(tracker.next_foot(), Foot::Right);
    }
}
