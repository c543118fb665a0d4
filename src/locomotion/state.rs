//! Motion state machine: classifies each tick as static, surface or air
//! motion and picks the dominant direction of travel.

use std::collections::VecDeque;

use glam::Vec3;

use super::config::LocomotionConfig;
use crate::animation::WalkDirection;

/// Locomotion state. Exactly one holds at any tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    #[default]
    Static,
    SurfaceMotion,
    AirMotion,
}

/// Dominant direction of travel in the avatar's local frame (-z forward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forwards,
    Backwards,
    #[default]
    None,
}

impl Direction {
    /// Walk template for this direction, if it is a horizontal one.
    pub fn walk_direction(self) -> Option<WalkDirection> {
        match self {
            Direction::Forwards => Some(WalkDirection::Forwards),
            Direction::Backwards => Some(WalkDirection::Backwards),
            Direction::Left => Some(WalkDirection::Left),
            Direction::Right => Some(WalkDirection::Right),
            Direction::Up | Direction::Down | Direction::None => None,
        }
    }
}

impl From<WalkDirection> for Direction {
    fn from(direction: WalkDirection) -> Self {
        match direction {
            WalkDirection::Forwards => Direction::Forwards,
            WalkDirection::Backwards => Direction::Backwards,
            WalkDirection::Left => Direction::Left,
            WalkDirection::Right => Direction::Right,
        }
    }
}

/// Per-tick input supplied by the host simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    /// Seconds since the previous tick.
    pub delta_time: f32,
    /// Avatar velocity in its local frame (m/s).
    pub velocity: Vec3,
    /// Height of the feet above the nearest walkable surface (m).
    pub height_above_surface: f32,
    /// Yaw change since the previous tick (degrees).
    pub yaw_delta: f32,
}

/// Boolean view of the current tick, derived in [`MotionState::assess`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionFlags {
    pub is_moving: bool,
    pub is_accelerating: bool,
    pub is_decelerating: bool,
    pub is_decelerating_fast: bool,
    pub is_on_surface: bool,
    pub is_under_gravity: bool,
    pub is_going_up: bool,
    pub is_coming_in_to_land: bool,
    pub is_walking_speed: bool,
    pub is_bouncing: bool,
}

impl MotionFlags {
    /// Walking to a stop; suppresses opening a walk transition.
    #[inline]
    pub fn is_coming_to_halt(&self) -> bool {
        self.is_decelerating
    }
}

/// One recorded tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRecord {
    pub velocity: Vec3,
    pub direction: Direction,
    pub distance_from_surface: f32,
    pub state: LocomotionState,
}

/// Rolling window of recent ticks, newest last.
#[derive(Clone, Debug)]
pub struct MotionHistory {
    frames: VecDeque<FrameRecord>,
    capacity: usize,
}

impl MotionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: FrameRecord) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(record);
    }

    #[inline]
    pub fn last(&self) -> Option<&FrameRecord> {
        self.frames.back()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.iter()
    }
}

/// Per-tick motion snapshot plus the history needed for derivatives.
#[derive(Clone, Debug)]
pub struct MotionState {
    /// State currently being displayed.
    pub state: LocomotionState,
    /// State decided by the latest assessment.
    pub next_state: LocomotionState,
    pub direction: Direction,
    /// Direction at the previous tick.
    pub last_direction: Direction,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Acceleration along the direction of travel.
    pub directed_acceleration: f32,
    pub yaw_delta: f32,
    pub delta_time: f32,
    pub distance_from_surface: f32,
    pub flags: MotionFlags,
    history: MotionHistory,
    ticks_since_landing: Option<u32>,
}

impl MotionState {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            state: LocomotionState::Static,
            next_state: LocomotionState::Static,
            direction: Direction::None,
            last_direction: Direction::None,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            directed_acceleration: 0.0,
            yaw_delta: 0.0,
            delta_time: 0.0,
            distance_from_surface: 0.0,
            flags: MotionFlags::default(),
            history: MotionHistory::new(config.history_length),
            ticks_since_landing: None,
        }
    }

    #[inline]
    pub fn history(&self) -> &MotionHistory {
        &self.history
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Classify this tick and decide `next_state` and `direction`.
    pub fn assess(&mut self, input: &TickInput, config: &LocomotionConfig) {
        self.delta_time = if input.delta_time.is_finite() { input.delta_time.max(0.0) } else { 0.0 };
        // A failed collision volume can report garbage velocity; treat it as still
        self.velocity = if input.velocity.is_finite() { input.velocity } else { Vec3::ZERO };
        self.yaw_delta = if input.yaw_delta.is_finite() { input.yaw_delta } else { 0.0 };
        self.distance_from_surface = if input.height_above_surface.is_nan() {
            f32::INFINITY
        } else {
            input.height_above_surface
        };

        let last = self.history.last().copied();
        let last_velocity = last.map(|f| f.velocity).unwrap_or(Vec3::ZERO);
        self.acceleration = if self.delta_time > 0.0 {
            (self.velocity - last_velocity) / self.delta_time
        } else {
            Vec3::ZERO
        };

        let on_surface = self.distance_from_surface < config.on_surface_threshold;
        let was_on_surface = last
            .map(|f| f.distance_from_surface < config.on_surface_threshold)
            .unwrap_or(true);
        self.ticks_since_landing = if on_surface && !was_on_surface {
            Some(0)
        } else {
            self.ticks_since_landing.map(|t| t.saturating_add(1))
        };
        let landed_recently = self
            .ticks_since_landing
            .is_some_and(|t| t < config.bounce_window_ticks);
        let is_bouncing =
            landed_recently && self.acceleration.y.abs() > config.bounce_acceleration_threshold;

        let (direction, mut directed) =
            classify_direction(self.velocity, self.acceleration, config.forward_bias);
        if is_bouncing && matches!(direction, Direction::Up | Direction::Down) {
            directed = 0.0;
        }
        self.direction = direction;
        self.directed_acceleration = directed;

        let speed = self.velocity.length();
        let lateral_speed = Vec3::new(self.velocity.x, 0.0, self.velocity.z).length();
        self.flags = MotionFlags {
            is_moving: speed > config.move_threshold,
            is_accelerating: directed > config.acceleration_threshold,
            is_decelerating: directed < config.deceleration_threshold,
            is_decelerating_fast: directed < config.fast_deceleration_threshold,
            is_on_surface: on_surface,
            is_under_gravity: self.distance_from_surface < config.gravity_threshold,
            is_going_up: !is_bouncing && self.velocity.y > config.overcome_gravity_speed,
            is_coming_in_to_land: self.distance_from_surface < config.landing_threshold
                && self.velocity.y < 0.0,
            is_walking_speed: lateral_speed <= config.max_walk_speed,
            is_bouncing,
        };

        let next = next_state(self.state, &self.flags);
        if next != self.next_state {
            log::debug!(
                "locomotion {:?} -> {:?} (direction {:?}, speed {:.2}, height {:.2})",
                self.state,
                next,
                self.direction,
                speed,
                self.distance_from_surface
            );
        }
        self.next_state = next;
    }

    /// Record this tick for the next tick's derivatives.
    pub fn save_history(&mut self) {
        self.history.push(FrameRecord {
            velocity: self.velocity,
            direction: self.direction,
            distance_from_surface: self.distance_from_surface,
            state: self.state,
        });
        self.last_direction = self.direction;
    }
}

/// Dominant direction of `velocity` and the acceleration along it.
///
/// Sideways motion must beat forward motion by `forward_bias` so banking
/// turns are not read as side-steps.
pub fn classify_direction(velocity: Vec3, acceleration: Vec3, forward_bias: f32) -> (Direction, f32) {
    let (ax, ay, az) = (velocity.x.abs(), velocity.y.abs(), velocity.z.abs());

    if ax > ay && ax > forward_bias * az {
        if velocity.x < 0.0 {
            (Direction::Left, -acceleration.x)
        } else {
            (Direction::Right, acceleration.x)
        }
    } else if ay > ax && ay > az {
        if velocity.y > 0.0 {
            (Direction::Up, acceleration.y)
        } else {
            (Direction::Down, -acceleration.y)
        }
    } else if forward_bias * az > ax && az > ay {
        if velocity.z < 0.0 {
            (Direction::Forwards, -acceleration.z)
        } else {
            (Direction::Backwards, acceleration.z)
        }
    } else {
        (Direction::None, 0.0)
    }
}

/// State transition rules.
fn next_state(current: LocomotionState, f: &MotionFlags) -> LocomotionState {
    let walkable = f.is_moving && f.is_on_surface && !f.is_going_up && f.is_walking_speed;
    let airborne = f.is_moving && (f.is_going_up || !f.is_on_surface);

    match current {
        LocomotionState::Static => {
            if walkable && !f.is_decelerating {
                LocomotionState::SurfaceMotion
            } else if airborne && !f.is_coming_in_to_land {
                LocomotionState::AirMotion
            } else {
                LocomotionState::Static
            }
        }
        LocomotionState::SurfaceMotion => {
            if !f.is_moving || f.is_decelerating {
                LocomotionState::Static
            } else if airborne || !f.is_walking_speed {
                LocomotionState::AirMotion
            } else {
                LocomotionState::SurfaceMotion
            }
        }
        LocomotionState::AirMotion => {
            if f.is_on_surface {
                if !f.is_moving {
                    LocomotionState::Static
                } else if f.is_going_up {
                    LocomotionState::AirMotion
                } else {
                    // Landing at speed still walks; the wheel clamp hides the skid
                    LocomotionState::SurfaceMotion
                }
            } else if !f.is_moving || f.is_decelerating_fast {
                LocomotionState::Static
            } else {
                LocomotionState::AirMotion
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn input(velocity: Vec3, height: f32) -> TickInput {
        TickInput {
            delta_time: DT,
            velocity,
            height_above_surface: height,
            yaw_delta: 0.0,
        }
    }

    /// Assess, adopt the decision and record history, as a session would.
    fn step(motion: &mut MotionState, config: &LocomotionConfig, velocity: Vec3, height: f32) {
        motion.assess(&input(velocity, height), config);
        motion.state = motion.next_state;
        motion.save_history();
    }

    #[test]
    fn test_classify_direction() {
        let bias = 100.0;
        assert_eq!(classify_direction(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO, bias).0, Direction::Forwards);
        assert_eq!(classify_direction(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO, bias).0, Direction::Backwards);
        assert_eq!(classify_direction(Vec3::new(-1.0, 0.0, 0.0), Vec3::ZERO, bias).0, Direction::Left);
        assert_eq!(classify_direction(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, bias).0, Direction::Right);
        assert_eq!(classify_direction(Vec3::new(0.0, 2.0, 0.5), Vec3::ZERO, bias).0, Direction::Up);
        assert_eq!(classify_direction(Vec3::new(0.0, -2.0, 0.5), Vec3::ZERO, bias).0, Direction::Down);
        assert_eq!(classify_direction(Vec3::ZERO, Vec3::ZERO, bias).0, Direction::None);
    }

    #[test]
    fn test_banking_turn_is_not_a_side_step() {
        // Mostly sideways but with a little forward speed
        let (dir, _) = classify_direction(Vec3::new(1.0, 0.0, -0.05), Vec3::ZERO, 100.0);
        assert_eq!(dir, Direction::Forwards);
    }

    #[test]
    fn test_directed_acceleration_sign() {
        let (dir, directed) =
            classify_direction(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -3.0), 100.0);
        assert_eq!(dir, Direction::Forwards);
        assert_eq!(directed, 3.0);
    }

    #[test]
    fn test_rest_is_static() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::ZERO, 0.0);
        assert_eq!(motion.next_state, LocomotionState::Static);
        assert_eq!(motion.direction, Direction::None);
    }

    #[test]
    fn test_start_walking_forwards() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::ZERO, 0.0);
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -2.5), 0.0);
        assert_eq!(motion.next_state, LocomotionState::SurfaceMotion);
        assert_eq!(motion.direction, Direction::Forwards);
        assert!(motion.flags.is_accelerating);

        // Constant velocity keeps walking
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -2.5), 0.0);
        assert_eq!(motion.next_state, LocomotionState::SurfaceMotion);
    }

    #[test]
    fn test_sudden_stop_returns_to_static() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -2.5), 0.0);
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -2.5), 0.0);
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(motion.flags.is_decelerating);
        assert_eq!(motion.next_state, LocomotionState::Static);
    }

    #[test]
    fn test_take_off_and_land() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::ZERO, 0.0);
        step(&mut motion, &config, Vec3::new(0.0, 3.0, 0.0), 0.5);
        assert_eq!(motion.state, LocomotionState::AirMotion);
        assert_eq!(motion.direction, Direction::Up);

        // Gliding forwards then touching down at walking speed
        step(&mut motion, &config, Vec3::new(0.0, -0.2, -2.0), 0.05);
        assert_eq!(motion.state, LocomotionState::SurfaceMotion);
    }

    #[test]
    fn test_flying_to_a_stop_hovers() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -10.0), 20.0);
        assert_eq!(motion.state, LocomotionState::AirMotion);
        step(&mut motion, &config, Vec3::ZERO, 20.0);
        assert_eq!(motion.state, LocomotionState::Static);
    }

    #[test]
    fn test_landing_bounce_ignored() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::new(0.0, -1.0, -2.0), 0.5);
        step(&mut motion, &config, Vec3::new(0.0, -1.0, -2.0), 0.2);
        // Touch down
        step(&mut motion, &config, Vec3::new(0.0, 0.0, -2.0), 0.0);
        assert_eq!(motion.state, LocomotionState::SurfaceMotion);
        // Physics bounce shortly after landing: a vertical spike that would read as a jump
        step(&mut motion, &config, Vec3::new(0.0, 0.6, -2.0), 0.0);
        assert!(motion.flags.is_bouncing);
        assert!(!motion.flags.is_going_up);
        assert_eq!(motion.state, LocomotionState::SurfaceMotion);
    }

    #[test]
    fn test_zero_delta_time_is_finite() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        motion.assess(
            &TickInput {
                delta_time: 0.0,
                velocity: Vec3::new(0.0, 0.0, -1.0),
                height_above_surface: 0.0,
                yaw_delta: 0.0,
            },
            &config,
        );
        assert!(motion.acceleration.is_finite());
        assert_eq!(motion.acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_invalid_velocity_treated_as_still() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        step(&mut motion, &config, Vec3::new(f32::NAN, 0.0, 0.0), 0.0);
        assert_eq!(motion.velocity, Vec3::ZERO);
        assert_eq!(motion.direction, Direction::None);
        assert_eq!(motion.state, LocomotionState::Static);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = LocomotionConfig::default();
        let mut motion = MotionState::new(&config);
        for _ in 0..(config.history_length * 3) {
            step(&mut motion, &config, Vec3::ZERO, 0.0);
        }
        assert_eq!(motion.history().len(), config.history_length);
    }
}
