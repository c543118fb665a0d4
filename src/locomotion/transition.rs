//! Cross-blends between animations, including nested chains.
//!
//! A transition owns the transition it interrupted (if any), so an
//! unfinished blend keeps decaying underneath the new one. The chain is
//! capped; opening past the cap drops the oldest link.

use glam::Vec3;

use super::config::TransitionParameters;
use super::state::Direction;
use super::wheel::{frequency_increment, FrequencyTimeWheel};
use crate::animation::pose::{evaluate_rotation, evaluate_translation};
use crate::animation::{AnimationId, AnimationSet, Joint, WalkDirection};
use crate::math::{angle_between, wrap_degrees};

/// Reported progress is rounded to a 1/1000 grid.
const PROGRESS_RESOLUTION: f32 = 1000.0;

/// Extra slack when testing whether the outgoing wheel reached its stop angle.
const STOP_ANGLE_SLACK: f32 = 0.1;

/// Result of [`Transition::update_progress`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionStatus {
    InProgress,
    Complete,
}

/// How the outgoing animation's wheel keeps turning during the blend.
#[derive(Clone, Copy, Debug, PartialEq)]
enum OutgoingRate {
    /// Fixed degrees per tick, taken from the main wheel's recent average.
    PerTick(f32),
    /// The outgoing animation's own frequency, in rad/s.
    Frequency(f32),
}

/// An in-progress cross-blend from `last` to `next`.
#[derive(Clone, Debug)]
pub struct Transition {
    next: AnimationId,
    last: AnimationId,
    last_direction: Direction,
    parameters: TransitionParameters,
    /// Unrounded accumulated progress.
    progress: f32,
    started: bool,
    last_wheel_pos: f32,
    rate: OutgoingRate,
    stop_angle: Option<f32>,
    frozen: bool,
    nested: Option<Box<Transition>>,
}

impl Transition {
    /// Snapshot the outgoing animation at the current wheel position.
    ///
    /// An outgoing walk blend is recorded as the directional template it
    /// holds, since the buffer may be rewritten before the blend finishes.
    pub fn new(
        last: AnimationId,
        next: AnimationId,
        last_direction: Direction,
        parameters: TransitionParameters,
        wheel: &FrequencyTimeWheel,
        set: &AnimationSet,
    ) -> Self {
        let last = match last {
            AnimationId::WalkBlend => AnimationId::Walk(
                set.walk_blend()
                    .source()
                    .unwrap_or(WalkDirection::Forwards),
            ),
            other => other,
        };
        let calibration = &set.curves(last).calibration;

        let (rate, stop_angle) = if last.is_walk() {
            let stop = calibration
                .stride_max_at
                .map(|at| next_stop_angle(at, wheel.position()));
            (OutgoingRate::PerTick(wheel.average_increment()), stop)
        } else {
            (OutgoingRate::Frequency(calibration.frequency), None)
        };

        Self {
            next,
            last,
            last_direction,
            parameters,
            progress: 0.0,
            started: false,
            last_wheel_pos: wheel.position(),
            rate,
            stop_angle,
            frozen: false,
            nested: None,
        }
    }

    /// Start this transition over `current`, keeping `current` as a nested
    /// link and trimming the chain to `max_depth` transitions.
    ///
    /// Re-entering the animation a decaying transition is leaving resumes
    /// the main wheel at that transition's phase. Nested links that were
    /// blending into the walk blend are pinned to the template it holds.
    pub fn open(
        mut self,
        current: Option<Box<Transition>>,
        wheel: &mut FrequencyTimeWheel,
        set: &AnimationSet,
        max_depth: usize,
    ) -> Box<Transition> {
        if let Some(previous) = &current {
            if previous.last.family() == self.next.family() {
                log::debug!(
                    "resyncing wheel {:.1} -> {:.1} from nested transition",
                    wheel.position(),
                    previous.last_wheel_pos
                );
                wheel.set_position(previous.last_wheel_pos);
            }
        }

        self.nested = current;
        if let Some(direction) = set.walk_blend().source() {
            if let Some(nested) = &mut self.nested {
                nested.snapshot_walk_blend(direction);
            }
        }
        if truncate_chain(&mut self.nested, max_depth.saturating_sub(1)) {
            log::debug!("transition chain truncated to {} links", max_depth);
        }

        log::debug!(
            "transition {:?} -> {:?} opened ({:.2}s, depth {})",
            self.last,
            self.next,
            self.parameters.duration,
            self.depth()
        );
        Box::new(self)
    }

    #[inline]
    pub fn next(&self) -> AnimationId {
        self.next
    }

    /// Outgoing animation, with a walk blend resolved to its template.
    #[inline]
    pub fn last(&self) -> AnimationId {
        self.last
    }

    #[inline]
    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    /// Linear progress in `[0, 1]`, rounded to the progress grid.
    #[inline]
    pub fn progress(&self) -> f32 {
        (self.progress * PROGRESS_RESOLUTION).round() / PROGRESS_RESOLUTION
    }

    /// Eased progress used to weight the incoming pose.
    #[inline]
    pub fn blend_factor(&self) -> f32 {
        self.parameters.easing.apply(self.progress())
    }

    #[inline]
    pub fn last_wheel_position(&self) -> f32 {
        self.last_wheel_pos
    }

    #[inline]
    pub fn stop_angle(&self) -> Option<f32> {
        self.stop_angle
    }

    /// Whether the outgoing wheel has stopped at its stop angle.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    pub fn nested(&self) -> Option<&Transition> {
        self.nested.as_deref()
    }

    /// Number of transitions in this chain, including this one.
    pub fn depth(&self) -> usize {
        1 + self.nested.as_ref().map_or(0, |n| n.depth())
    }

    /// Accumulate progress. The tick a transition is opened leaves progress
    /// at zero. Nested links advance too and are dropped once complete.
    pub fn update_progress(&mut self, delta_time: f32) -> TransitionStatus {
        if let Some(nested) = &mut self.nested {
            if nested.update_progress(delta_time) == TransitionStatus::Complete {
                log::debug!("nested transition to {:?} complete", nested.next);
                self.nested = None;
            }
        }

        if !self.started {
            self.started = true;
            return TransitionStatus::InProgress;
        }

        let step = if self.parameters.duration > 0.0 {
            delta_time.max(0.0) / self.parameters.duration
        } else {
            1.0
        };
        self.progress = (self.progress + step).min(1.0);

        if self.progress() >= 1.0 {
            self.progress = 1.0;
            TransitionStatus::Complete
        } else {
            TransitionStatus::InProgress
        }
    }

    /// Replace every reference to the live walk blend in this chain with the
    /// `direction` template it currently holds.
    fn snapshot_walk_blend(&mut self, direction: WalkDirection) {
        if self.next == AnimationId::WalkBlend {
            self.next = AnimationId::Walk(direction);
        }
        if let Some(nested) = &mut self.nested {
            nested.snapshot_walk_blend(direction);
        }
    }

    /// Turn the outgoing wheels of this transition and every nested link.
    ///
    /// An outgoing walk holds still once its feet reach the stop angle.
    pub fn advance_outgoing_wheel(&mut self, delta_time: f32) {
        if let Some(nested) = &mut self.nested {
            nested.advance_outgoing_wheel(delta_time);
        }
        if self.frozen {
            return;
        }

        let increment = match self.rate {
            OutgoingRate::PerTick(degrees) => degrees,
            OutgoingRate::Frequency(frequency) => frequency_increment(frequency, delta_time),
        };
        self.last_wheel_pos = wrap_degrees(self.last_wheel_pos + increment);

        if let Some(stop) = self.stop_angle {
            if angle_between(self.last_wheel_pos, stop) < increment.abs() + STOP_ANGLE_SLACK {
                self.last_wheel_pos = stop;
                self.frozen = true;
            }
        }
    }

    /// Rotation of `joint`, blending the outgoing chain into the incoming
    /// animation evaluated at `wheel`.
    pub fn blend_rotation(&self, joint: Joint, wheel: f32, set: &AnimationSet) -> Vec3 {
        let incoming = evaluate_rotation(set.curves(self.next), joint, wheel);
        let outgoing = match &self.nested {
            Some(nested) => nested.blend_rotation(joint, self.last_wheel_pos, set),
            None => evaluate_rotation(set.curves(self.last), joint, self.last_wheel_pos),
        };
        outgoing.lerp(incoming, self.blend_factor())
    }

    /// Hips translation, blended the same way as [`Self::blend_rotation`].
    pub fn blend_translation(&self, wheel: f32, set: &AnimationSet) -> Vec3 {
        let incoming = evaluate_translation(set.curves(self.next), wheel);
        let outgoing = match &self.nested {
            Some(nested) => nested.blend_translation(self.last_wheel_pos, set),
            None => evaluate_translation(set.curves(self.last), self.last_wheel_pos),
        };
        outgoing.lerp(incoming, self.blend_factor())
    }
}

/// First "feet passing" angle ahead of `position` for a walk whose stride
/// peaks at `stride_max_at`.
fn next_stop_angle(stride_max_at: f32, position: f32) -> f32 {
    let a = wrap_degrees(stride_max_at + 90.0);
    let b = wrap_degrees(stride_max_at + 270.0);
    if wrap_degrees(a - position) <= wrap_degrees(b - position) { a } else { b }
}

/// Keep at most `remaining` links of the chain. Returns whether any were dropped.
fn truncate_chain(link: &mut Option<Box<Transition>>, remaining: usize) -> bool {
    if remaining == 0 {
        return link.take().is_some();
    }
    match link {
        Some(transition) => truncate_chain(&mut transition.nested, remaining - 1),
        None => false,
    }
}
