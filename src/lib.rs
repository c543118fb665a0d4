//! Gaitwheel - procedural locomotion for articulated avatars
//!
//! Drives analytic gait and flight curves from an avatar's live velocity,
//! height and turn rate, cross-blending between animations as the avatar
//! starts, stops, turns, takes off and lands.

pub mod core;
pub mod math;
pub mod filters;
pub mod animation;
pub mod locomotion;
