//! Locomotion engine
//!
//! Per tick, in order: motion assessment, animation selection, stride and
//! wheel advance, transition progress, pose rendering, history recording.

pub mod config;
pub mod footstep;
pub mod lean;
pub mod selector;
pub mod session;
pub mod state;
pub mod transition;
pub mod wheel;

pub use config::{FootstepConfig, LocomotionConfig, TransitionConfig, TransitionParameters, TransitionRule};
pub use footstep::{Foot, Footstep, FootstepTracker};
pub use lean::{Lean, LeanFilters};
pub use selector::{choose_target, AnimationSelector, Selection};
pub use session::{FootSampler, LocomotionSession, NoFeet, PoseFrame};
pub use state::{Direction, LocomotionState, MotionFlags, MotionState, TickInput};
pub use transition::{Transition, TransitionStatus};
pub use wheel::FrequencyTimeWheel;
