//! Mathematical utilities

pub mod angle;

pub use angle::{angle_between, wrap_degrees, within, FULL_TURN};
