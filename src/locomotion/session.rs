//! Per-avatar locomotion session: one `tick` per simulation frame.

use glam::Vec3;

use super::config::LocomotionConfig;
use super::footstep::{Footstep, FootstepTracker};
use super::lean::{Lean, LeanFilters};
use super::selector::AnimationSelector;
use super::state::{Direction, LocomotionState, MotionState, TickInput};
use super::transition::{Transition, TransitionStatus};
use super::wheel::FrequencyTimeWheel;
use crate::animation::pose::{
    apply_lean_rotation, clamp_hips_translation, evaluate_rotation, evaluate_translation, lean_offset,
};
use crate::animation::{
    AnimationId, AnimationSet, AvatarAssets, AvatarOptions, Calibration, FlyDirection, IkChain, Joint,
    JointTable,
};
use crate::core::Result;
use crate::math::within;

/// Source of live foot positions, sampled only when the stride is
/// re-measured.
pub trait FootSampler {
    /// World-space (left, right) foot positions, if available.
    fn sample(&mut self) -> Option<(Vec3, Vec3)>;
}

impl<F> FootSampler for F
where
    F: FnMut() -> Option<(Vec3, Vec3)>,
{
    fn sample(&mut self) -> Option<(Vec3, Vec3)> {
        self()
    }
}

/// Sampler for hosts that cannot report foot positions. The stride stays at
/// the template value.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFeet;

impl FootSampler for NoFeet {
    fn sample(&mut self) -> Option<(Vec3, Vec3)> {
        None
    }
}

/// Output of one tick.
#[derive(Clone, Debug)]
pub struct PoseFrame {
    /// Hips offset, clamped to ±1 per axis.
    pub hips_translation: Vec3,
    /// Rotation in degrees about (x, y, z) for each animated joint.
    pub rotations: JointTable<Vec3>,
    pub footstep: Option<Footstep>,
    pub state: LocomotionState,
    pub direction: Direction,
    /// Animation being displayed (the incoming one during a transition).
    pub animation: AnimationId,
    pub lean: Lean,
}

/// Locomotion state for one avatar.
#[derive(Debug)]
pub struct LocomotionSession {
    config: LocomotionConfig,
    animations: AnimationSet,
    calibration: Calibration,
    options: AvatarOptions,
    motion: MotionState,
    wheel: FrequencyTimeWheel,
    selector: AnimationSelector,
    lean: LeanFilters,
    footsteps: FootstepTracker,
    current: AnimationId,
    transition: Option<Box<Transition>>,
}

impl LocomotionSession {
    /// Validate the assets and config and start at rest on idle.
    pub fn new(assets: AvatarAssets, config: LocomotionConfig) -> Result<Self> {
        assets.validate()?;
        config.validate()?;

        let (animations, calibration, options) = AnimationSet::from_assets(assets);
        log::info!(
            "Locomotion session ready (stride {:.2}m, hips {:.2}m, footsteps {})",
            calibration.stride_length,
            calibration.hips_to_feet,
            options.makes_footstep_sounds
        );

        Ok(Self {
            motion: MotionState::new(&config),
            selector: AnimationSelector::new(&config),
            wheel: FrequencyTimeWheel::new(),
            lean: LeanFilters::new(),
            footsteps: FootstepTracker::new(),
            current: AnimationId::Idle,
            transition: None,
            config,
            animations,
            calibration,
            options,
        })
    }

    // --- Accessors ---

    #[inline]
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    #[inline]
    pub fn animations(&self) -> &AnimationSet {
        &self.animations
    }

    #[inline]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    #[inline]
    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    #[inline]
    pub fn state(&self) -> LocomotionState {
        self.motion.state
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.motion.direction
    }

    #[inline]
    pub fn wheel(&self) -> &FrequencyTimeWheel {
        &self.wheel
    }

    #[inline]
    pub fn current_animation(&self) -> AnimationId {
        self.current
    }

    #[inline]
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_deref()
    }

    /// Normalised flight blend weights from the last airborne tick.
    pub fn fly_weights(&self) -> [(FlyDirection, f32); 4] {
        self.selector.fly_weights()
    }

    // --- Tick ---

    /// Run one frame: assess, select, advance the wheel, progress
    /// transitions, render and record history.
    pub fn tick(&mut self, input: &TickInput, feet: &mut impl FootSampler) -> PoseFrame {
        self.motion.assess(input, &self.config);
        let dt = self.motion.delta_time;

        self.select();
        self.determine_stride(feet);
        self.advance_wheel(dt);
        self.update_transitions(dt);

        let lean = self.lean.update(&self.motion, &self.calibration, self.config.top_speed);
        let footstep = self.check_footstep();
        let frame = self.render(lean, footstep);

        self.motion.save_history();
        frame
    }

    /// Drop all motion history, filter state and transitions. Measured
    /// calibration is kept.
    pub fn reset(&mut self) {
        self.motion = MotionState::new(&self.config);
        self.wheel.reset();
        self.selector.reset();
        self.lean.reset();
        self.footsteps.restart();
        self.transition = None;
        self.current = AnimationId::Idle;
        self.animations.release_walk_blend();
        log::debug!("locomotion session reset");
    }

    fn select(&mut self) {
        let selection = self.selector.select(
            &self.motion,
            self.current,
            &mut self.animations,
            &mut self.calibration,
        );
        self.motion.state = self.motion.next_state;

        if !selection.open_transition {
            return;
        }

        if selection.target == AnimationId::WalkBlend && self.transition.is_none() {
            self.footsteps.restart();
        }

        let parameters = self
            .config
            .transitions
            .parameters(self.current.kind(), selection.target.kind());
        let transition = Transition::new(
            self.current,
            selection.target,
            self.motion.last_direction,
            parameters,
            &self.wheel,
            &self.animations,
        );
        self.transition = Some(transition.open(
            self.transition.take(),
            &mut self.wheel,
            &self.animations,
            self.config.max_transition_recursion,
        ));

        // The outgoing transition has resolved its walk template by now
        if self.current == AnimationId::WalkBlend {
            self.animations.release_walk_blend();
        }
        self.current = selection.target;
    }

    /// Re-measure the stride from live foot positions while walking steadily
    /// near peak speed with the feet at full extension.
    fn determine_stride(&mut self, feet: &mut impl FootSampler) {
        if self.current != AnimationId::WalkBlend || self.transition.is_some() {
            return;
        }
        if self.motion.speed() < self.config.stride_sample_speed_ratio * self.config.max_walk_speed {
            return;
        }
        let Some(stride_max_at) = self.animations.walk_blend().curves().calibration.stride_max_at else {
            return;
        };
        if !within(self.wheel.position(), stride_max_at, self.config.stride_sample_tolerance) {
            return;
        }
        let Some((left, right)) = feet.sample() else {
            return;
        };

        let stride = Vec3::new(left.x - right.x, 0.0, left.z - right.z).length();
        if stride.is_finite() && stride > 0.0 {
            log::debug!("stride re-measured: {:.3} -> {:.3}", self.calibration.stride_length, stride);
            self.calibration.stride_length = stride;
            self.animations.store_walk_stride(stride);
        }
    }

    fn advance_wheel(&mut self, dt: f32) {
        let max_increment = self.config.max_wheel_increment;
        let applied = if self.current == AnimationId::WalkBlend {
            self.wheel
                .advance_walk(self.motion.speed(), self.calibration.stride_length, dt, max_increment)
        } else {
            let frequency = self.animations.curves(self.current).calibration.frequency;
            self.wheel.advance_frequency(frequency, dt, max_increment)
        };
        log::trace!(
            "wheel {:.2} ({:?}, applied {:?})",
            self.wheel.position(),
            self.current,
            applied
        );
    }

    fn update_transitions(&mut self, dt: f32) {
        let Some(transition) = &mut self.transition else {
            return;
        };
        transition.advance_outgoing_wheel(dt);
        if transition.update_progress(dt) == TransitionStatus::Complete {
            log::debug!("transition to {:?} complete", transition.next());
            self.transition = None;
        }
    }

    /// Footsteps follow whichever wheel drives an audible walk: the main
    /// wheel while walking, or the outgoing wheel while a walk blends out.
    fn check_footstep(&mut self) -> Option<Footstep> {
        if !self.options.makes_footstep_sounds {
            return None;
        }
        let wheel = if self.current == AnimationId::WalkBlend {
            if self.motion.state != LocomotionState::SurfaceMotion {
                return None;
            }
            self.wheel.position()
        } else {
            match &self.transition {
                Some(transition) if transition.last().is_walk() => transition.last_wheel_position(),
                _ => return None,
            }
        };
        self.footsteps.check(
            wheel,
            self.motion.speed(),
            self.config.max_walk_speed,
            &self.config.footsteps,
        )
    }

    fn is_emitted(&self, joint: Joint) -> bool {
        match joint.chain() {
            IkChain::LeftArm | IkChain::RightArm => !self.options.arms_free,
            IkChain::Head => !self.options.head_free,
            _ => true,
        }
    }

    fn render(&self, lean: Lean, footstep: Option<Footstep>) -> PoseFrame {
        let wheel = self.wheel.position();
        let curves = self.animations.curves(self.current);
        let outgoing = self.transition.as_ref().map(|t| self.animations.curves(t.last()));

        let mut rotations = JointTable::new();
        for joint in Joint::ALL {
            if !self.is_emitted(joint) {
                continue;
            }
            let animated = curves.joint(joint).is_some()
                || outgoing.is_some_and(|c| c.joint(joint).is_some());
            if !animated {
                continue;
            }
            let mut rotation = match &self.transition {
                Some(transition) => transition.blend_rotation(joint, wheel, &self.animations),
                None => evaluate_rotation(curves, joint, wheel),
            };
            if joint == Joint::Hips {
                rotation = apply_lean_rotation(rotation, lean.pitch, lean.roll);
            }
            rotations.insert(joint, rotation);
        }

        let base = match &self.transition {
            Some(transition) => transition.blend_translation(wheel, &self.animations),
            None => evaluate_translation(curves, wheel),
        };
        let hips_translation =
            clamp_hips_translation(base + lean_offset(self.calibration.hips_to_feet, lean.pitch, lean.roll));

        PoseFrame {
            hips_translation,
            rotations,
            footstep,
            state: self.motion.state,
            direction: self.motion.direction,
            animation: self.current,
            lean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{presets, WalkDirection};
    use crate::locomotion::footstep::Foot;

    fn session() -> LocomotionSession {
        LocomotionSession::new(presets::procedural_avatar(), LocomotionConfig::default()).unwrap()
    }

    fn input(dt: f32, velocity: Vec3, height: f32) -> TickInput {
        TickInput {
            delta_time: dt,
            velocity,
            height_above_surface: height,
            yaw_delta: 0.0,
        }
    }

    #[test]
    fn test_rest_then_walk_forwards() {
        let mut session = session();
        let dt = 0.05;

        // Settle at rest
        for _ in 0..5 {
            let frame = session.tick(&input(dt, Vec3::ZERO, 0.0), &mut NoFeet);
            assert_eq!(frame.state, LocomotionState::Static);
            assert_eq!(frame.animation, AnimationId::Idle);
            assert!(session.transition().is_none());
        }

        // Start walking forwards
        let walk = input(dt, Vec3::new(0.0, 0.0, -2.5), 0.0);
        let frame = session.tick(&walk, &mut NoFeet);
        assert_eq!(frame.state, LocomotionState::SurfaceMotion);
        assert_eq!(frame.direction, Direction::Forwards);
        assert_eq!(frame.animation, AnimationId::WalkBlend);
        let transition = session.transition().unwrap();
        assert_eq!(transition.last(), AnimationId::Idle);
        assert_eq!(transition.next(), AnimationId::WalkBlend);
        assert_eq!(transition.progress(), 0.0);

        // Idle -> walk takes 0.35s: seven 0.05s ticks
        for _ in 0..6 {
            session.tick(&walk, &mut NoFeet);
            assert!(session.transition().is_some());
        }
        session.tick(&walk, &mut NoFeet);
        assert!(session.transition().is_none());
        assert_eq!(session.current_animation(), AnimationId::WalkBlend);
        assert_eq!(session.state(), LocomotionState::SurfaceMotion);
    }

    #[test]
    fn test_direction_change_copies_once_without_transition() {
        let mut session = session();
        let dt = 1.0 / 60.0;
        for _ in 0..60 {
            session.tick(&input(dt, Vec3::new(0.0, 0.0, -1.5), 0.0), &mut NoFeet);
        }
        assert_eq!(session.animations().walk_blend().copy_count(), 1);
        assert!(session.transition().is_none());

        for _ in 0..30 {
            let frame = session.tick(&input(dt, Vec3::new(-1.5, 0.0, 0.0), 0.0), &mut NoFeet);
            assert_eq!(frame.direction, Direction::Left);
            assert!(session.transition().is_none());
        }
        assert_eq!(session.animations().walk_blend().copy_count(), 2);
        assert_eq!(session.animations().walk_blend().source(), Some(WalkDirection::Left));
        let left_stride = session.animations().walk(WalkDirection::Left).calibration().stride_length;
        assert_eq!(Some(session.calibration().stride_length), left_stride);
    }

    #[test]
    fn test_hips_translation_clamped() {
        let mut assets = presets::procedural_avatar();
        assets.calibration.hips_to_feet = 40.0;
        let mut session = LocomotionSession::new(assets, LocomotionConfig::default()).unwrap();

        // Flying flat out forwards leans fully, pushing the hips ~5.5m
        let mut frame = session.tick(&input(0.05, Vec3::new(0.0, 0.0, -300.0), 50.0), &mut NoFeet);
        for _ in 0..300 {
            frame = session.tick(&input(0.05, Vec3::new(0.0, 0.0, -300.0), 50.0), &mut NoFeet);
            let t = frame.hips_translation;
            assert!(t.abs().max_element() <= 1.0);
        }
        assert_eq!(frame.state, LocomotionState::AirMotion);
        assert_eq!(frame.hips_translation.z, 1.0);
    }

    #[test]
    fn test_footsteps_alternate_while_walking() {
        let mut session = session();
        let walk = input(1.0 / 60.0, Vec3::new(0.0, 0.0, -2.0), 0.0);
        let steps: Vec<Foot> = (0..300)
            .filter_map(|_| session.tick(&walk, &mut NoFeet).footstep)
            .map(|step| step.foot)
            .collect();

        assert!(steps.len() >= 4);
        assert_eq!(steps[0], Foot::Right);
        for pair in steps.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_footsteps_continue_while_walk_blends_out() {
        let mut session = session();
        let dt = 1.0 / 60.0;
        let walk = input(dt, Vec3::new(0.0, 0.0, -2.0), 0.0);
        for _ in 0..60 {
            session.tick(&walk, &mut NoFeet);
        }
        // Right foot has struck this cycle; the left is next at 270
        let mut guard = 0;
        while !(185.0..250.0).contains(&session.wheel().position()) {
            session.tick(&walk, &mut NoFeet);
            guard += 1;
            assert!(guard < 200);
        }

        let mut blending_out = 0;
        let mut steps = Vec::new();
        for _ in 0..60 {
            let frame = session.tick(&input(dt, Vec3::ZERO, 0.0), &mut NoFeet);
            if session.transition().is_some_and(|t| t.last().is_walk()) {
                blending_out += 1;
                steps.extend(frame.footstep.map(|step| step.foot));
            }
        }
        assert!(blending_out > 0);
        assert_eq!(steps, vec![Foot::Left]);
        assert_eq!(session.current_animation(), AnimationId::Idle);
    }

    #[test]
    fn test_silent_avatar_has_no_footsteps() {
        let mut assets = presets::procedural_avatar();
        assets.options.makes_footstep_sounds = false;
        let mut session = LocomotionSession::new(assets, LocomotionConfig::default()).unwrap();
        let walk = input(1.0 / 60.0, Vec3::new(0.0, 0.0, -2.0), 0.0);
        assert!((0..300).all(|_| session.tick(&walk, &mut NoFeet).footstep.is_none()));
    }

    #[test]
    fn test_free_arms_not_emitted() {
        let mut assets = presets::procedural_avatar();
        assets.options.arms_free = true;
        let mut session = LocomotionSession::new(assets, LocomotionConfig::default()).unwrap();
        let frame = session.tick(&input(0.05, Vec3::ZERO, 0.0), &mut NoFeet);
        assert!(!frame.rotations.contains(Joint::LeftArm));
        assert!(!frame.rotations.contains(Joint::RightHand));
        assert!(frame.rotations.contains(Joint::Spine));
        assert!(frame.rotations.contains(Joint::Head));
    }

    #[test]
    fn test_stride_measured_at_full_extension() {
        let mut session = session();
        // 2.85 m/s on a 0.9m stride turns the wheel 570 deg/s: 9 deg per tick
        let walk = input(9.0 / 570.0, Vec3::new(0.0, 0.0, -2.85), 0.0);
        let mut sampled = 0;
        let mut feet = || {
            sampled += 1;
            Some((Vec3::new(0.0, 0.9, 0.35), Vec3::new(0.0, 0.1, -0.35)))
        };
        for _ in 0..120 {
            session.tick(&walk, &mut feet);
        }
        assert!(sampled > 0);
        assert!((session.calibration().stride_length - 0.7).abs() < 1e-5);
        assert_eq!(session.animations().walk_blend_stride(), Some(session.calibration().stride_length));
    }

    #[test]
    fn test_hover_when_static_above_ground() {
        let mut session = session();
        let frame = session.tick(&input(0.05, Vec3::ZERO, 10.0), &mut NoFeet);
        assert_eq!(frame.state, LocomotionState::Static);
        assert_eq!(frame.animation, AnimationId::Hover);
        assert!(session.transition().is_some());
    }

    #[test]
    fn test_interrupted_transition_nests() {
        let mut session = session();
        let dt = 0.05;
        session.tick(&input(dt, Vec3::new(0.0, 0.0, -2.0), 0.0), &mut NoFeet);
        assert_eq!(session.current_animation(), AnimationId::WalkBlend);

        // Take off before the walk blend has finished ramping in
        session.tick(&input(dt, Vec3::new(0.0, 4.0, -2.0), 1.0), &mut NoFeet);
        assert_eq!(session.current_animation(), AnimationId::FlyBlend);
        let transition = session.transition().unwrap();
        assert_eq!(transition.depth(), 2);
        assert_eq!(transition.last(), AnimationId::Walk(WalkDirection::Forwards));
        assert_eq!(session.animations().walk_blend().source(), None);

        // The ramp-in underneath keeps the forwards template
        let ramp_in = transition.nested().unwrap();
        assert_eq!(ramp_in.next(), AnimationId::Walk(WalkDirection::Forwards));

        // Landing to the left rewrites the walk blend but not the nested links
        session.tick(&input(dt, Vec3::new(-2.0, 0.0, 0.0), 0.0), &mut NoFeet);
        assert_eq!(session.current_animation(), AnimationId::WalkBlend);
        assert_eq!(session.animations().walk_blend().source(), Some(WalkDirection::Left));
        let chain = session.transition().unwrap();
        assert_eq!(chain.depth(), 3);
        let ramp_in = chain.nested().and_then(|t| t.nested()).unwrap();
        assert_eq!(ramp_in.next(), AnimationId::Walk(WalkDirection::Forwards));
    }

    #[test]
    fn test_degenerate_input_stays_finite() {
        let mut session = session();
        let inputs = [
            input(0.0, Vec3::new(0.0, 0.0, -2.0), 0.0),
            input(-1.0, Vec3::new(3.0, 0.0, 0.0), 0.0),
            input(0.05, Vec3::new(f32::NAN, 0.0, 0.0), f32::NAN),
            input(0.05, Vec3::new(0.0, 0.0, 0.0), 5.0),
        ];
        for tick in inputs {
            let frame = session.tick(&tick, &mut NoFeet);
            assert!(frame.hips_translation.is_finite());
            assert!(frame.rotations.iter().all(|(_, r)| r.is_finite()));
            assert!((0.0..360.0).contains(&session.wheel().position()));
        }
    }

    #[test]
    fn test_reset() {
        let mut session = session();
        for _ in 0..10 {
            session.tick(&input(0.05, Vec3::new(0.0, 0.0, -2.0), 0.0), &mut NoFeet);
        }
        session.reset();
        assert_eq!(session.current_animation(), AnimationId::Idle);
        assert!(session.transition().is_none());
        assert_eq!(session.state(), LocomotionState::Static);
        assert_eq!(session.wheel().position(), 0.0);
        assert!(session.motion().history().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LocomotionConfig {
            max_transition_recursion: 0,
            ..Default::default()
        };
        assert!(LocomotionSession::new(presets::procedural_avatar(), config).is_err());
    }
}
