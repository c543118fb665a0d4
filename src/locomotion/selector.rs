//! Maps the assessed motion to a target animation and maintains the two
//! blend buffers.

use glam::Vec3;

use super::config::LocomotionConfig;
use super::state::{LocomotionState, MotionState};
use crate::animation::{AnimationId, AnimationSet, Calibration, FlyDirection, WalkDirection};
use crate::filters::AveragingFilter;

/// Target animation for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub target: AnimationId,
    /// Whether a cross-blend from the current animation should open.
    pub open_transition: bool,
}

/// Pick the animation for `next_state`.
///
/// A direction change inside the walk blend keeps the same target, so it
/// never reopens a transition. While walking to a halt the current
/// animation is held rather than blending into a walk.
pub fn choose_target(
    next_state: LocomotionState,
    current: AnimationId,
    on_surface: bool,
    coming_to_halt: bool,
) -> Selection {
    let target = match next_state {
        LocomotionState::Static if on_surface => AnimationId::Idle,
        LocomotionState::Static => AnimationId::Hover,
        LocomotionState::SurfaceMotion if coming_to_halt && current != AnimationId::WalkBlend => current,
        LocomotionState::SurfaceMotion => AnimationId::WalkBlend,
        LocomotionState::AirMotion => AnimationId::FlyBlend,
    };
    Selection {
        target,
        open_transition: target != current,
    }
}

/// Raw directional influences (up, down, forwards, backwards) of a flight
/// velocity. Each is non-negative; horizontal thrust counts half.
pub fn raw_fly_weights(velocity: Vec3) -> [f32; 4] {
    let speed = velocity.length();
    if !(speed > 0.0) {
        return [0.0; 4];
    }
    let v = velocity / speed;
    [
        v.y.max(0.0),
        (-v.y).max(0.0),
        (-v.z * 0.5).max(0.0),
        (v.z * 0.5).max(0.0),
    ]
}

/// Stateful part of animation selection.
#[derive(Clone, Debug)]
pub struct AnimationSelector {
    /// One damping filter per flight direction, in `FlyDirection::ALL` order.
    fly_filters: [AveragingFilter; 4],
    fly_weights: [f32; 4],
}

impl AnimationSelector {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            fly_filters: std::array::from_fn(|_| AveragingFilter::new(config.fly_blend_damping)),
            fly_weights: [0.0; 4],
        }
    }

    /// Normalised flight weights from the last AIR tick.
    pub fn fly_weights(&self) -> [(FlyDirection, f32); 4] {
        std::array::from_fn(|i| (FlyDirection::ALL[i], self.fly_weights[i]))
    }

    /// Choose the target and refresh the blend buffer it reads from.
    pub fn select(
        &mut self,
        motion: &MotionState,
        current: AnimationId,
        set: &mut AnimationSet,
        calibration: &mut Calibration,
    ) -> Selection {
        let selection = choose_target(
            motion.next_state,
            current,
            motion.flags.is_on_surface,
            motion.flags.is_coming_to_halt(),
        );

        match selection.target {
            AnimationId::WalkBlend => {
                // No usable direction on the ground means the collision
                // volume gave up; walk forwards
                let direction = motion
                    .direction
                    .walk_direction()
                    .unwrap_or(WalkDirection::Forwards);
                if set.select_walk(direction) {
                    if let Some(stride) = set.walk_blend_stride() {
                        calibration.stride_length = stride;
                    }
                    log::debug!(
                        "walk blend now {:?} (stride {:.3})",
                        direction,
                        calibration.stride_length
                    );
                }
            }
            AnimationId::FlyBlend => self.update_flight(motion.velocity, set),
            _ => {}
        }

        selection
    }

    /// Filter, normalise and blend the flight templates. A zero normaliser
    /// leaves the fly blend at identity.
    fn update_flight(&mut self, velocity: Vec3, set: &mut AnimationSet) {
        let raw = raw_fly_weights(velocity);
        let mut filtered = [0.0; 4];
        for ((out, filter), value) in filtered.iter_mut().zip(&mut self.fly_filters).zip(raw) {
            *out = filter.process(value);
        }

        let total: f32 = filtered.iter().sum();
        self.fly_weights = if velocity.length() > 0.0 && total > 0.0 {
            filtered.map(|w| w / total)
        } else {
            [0.0; 4]
        };
        set.blend_flight(&self.fly_weights());
    }

    pub fn reset(&mut self) {
        for filter in &mut self.fly_filters {
            filter.reset();
        }
        self.fly_weights = [0.0; 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::presets;
    use crate::locomotion::state::Direction;

    fn setup() -> (AnimationSet, Calibration, LocomotionConfig) {
        let (set, calibration, _) = AnimationSet::from_assets(presets::procedural_avatar());
        (set, calibration, LocomotionConfig::default())
    }

    fn walking(config: &LocomotionConfig, direction: Direction) -> MotionState {
        let mut motion = MotionState::new(config);
        motion.next_state = LocomotionState::SurfaceMotion;
        motion.direction = direction;
        motion.flags.is_on_surface = true;
        motion
    }

    #[test]
    fn test_choose_target() {
        let idle = AnimationId::Idle;
        assert_eq!(
            choose_target(LocomotionState::Static, idle, true, false),
            Selection { target: AnimationId::Idle, open_transition: false }
        );
        assert_eq!(choose_target(LocomotionState::Static, idle, false, false).target, AnimationId::Hover);
        assert_eq!(
            choose_target(LocomotionState::SurfaceMotion, idle, true, false),
            Selection { target: AnimationId::WalkBlend, open_transition: true }
        );
        assert!(!choose_target(LocomotionState::SurfaceMotion, AnimationId::WalkBlend, true, false).open_transition);
        assert_eq!(choose_target(LocomotionState::AirMotion, idle, false, false).target, AnimationId::FlyBlend);
    }

    #[test]
    fn test_coming_to_halt_holds_current() {
        let selection = choose_target(LocomotionState::SurfaceMotion, AnimationId::FlyBlend, true, true);
        assert_eq!(selection.target, AnimationId::FlyBlend);
        assert!(!selection.open_transition);
    }

    #[test]
    fn test_direction_change_copies_once() {
        let (mut set, mut calibration, config) = setup();
        let mut selector = AnimationSelector::new(&config);

        selector.select(&walking(&config, Direction::Forwards), AnimationId::Idle, &mut set, &mut calibration);
        assert_eq!(set.walk_blend().copy_count(), 1);
        let forward_stride = set.walk(WalkDirection::Forwards).calibration().stride_length;
        assert_eq!(Some(calibration.stride_length), forward_stride);

        let left = walking(&config, Direction::Left);
        for _ in 0..5 {
            let selection = selector.select(&left, AnimationId::WalkBlend, &mut set, &mut calibration);
            assert!(!selection.open_transition);
        }
        assert_eq!(set.walk_blend().copy_count(), 2);
        let left_stride = set.walk(WalkDirection::Left).calibration().stride_length;
        assert_eq!(Some(calibration.stride_length), left_stride);
    }

    #[test]
    fn test_indeterminate_direction_walks_forwards() {
        let (mut set, mut calibration, config) = setup();
        let mut selector = AnimationSelector::new(&config);
        selector.select(&walking(&config, Direction::None), AnimationId::Idle, &mut set, &mut calibration);
        assert_eq!(set.walk_blend().source(), Some(WalkDirection::Forwards));
    }

    #[test]
    fn test_fly_weights_normalised() {
        let (mut set, mut calibration, config) = setup();
        let mut selector = AnimationSelector::new(&config);
        let mut motion = MotionState::new(&config);
        motion.next_state = LocomotionState::AirMotion;

        for velocity in [Vec3::new(0.0, 2.0, -4.0), Vec3::new(0.0, -1.0, 3.0), Vec3::new(0.0, 5.0, 0.0)] {
            motion.velocity = velocity;
            selector.select(&motion, AnimationId::FlyBlend, &mut set, &mut calibration);
            let weights = selector.fly_weights();
            let total: f32 = weights.iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-5);
            assert!(weights.iter().all(|(_, w)| *w >= 0.0));
        }
    }

    #[test]
    fn test_zero_velocity_flight_is_identity() {
        let (mut set, mut calibration, config) = setup();
        let mut selector = AnimationSelector::new(&config);
        let mut motion = MotionState::new(&config);
        motion.next_state = LocomotionState::AirMotion;
        motion.velocity = Vec3::ZERO;

        selector.select(&motion, AnimationId::Idle, &mut set, &mut calibration);
        assert!(selector.fly_weights().iter().all(|(_, w)| *w == 0.0));
        assert_eq!(set.fly_blend().curves().calibration.frequency, 0.0);
    }

    #[test]
    fn test_raw_fly_weights() {
        let w = raw_fly_weights(Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(w, [0.0, 0.0, 0.5, 0.0]);
        let w = raw_fly_weights(Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(w, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(raw_fly_weights(Vec3::ZERO), [0.0; 4]);
    }
}
