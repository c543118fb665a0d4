//! Angle helpers for phase wheels and lean curves.
//!
//! Wheel positions are kept in degrees because every waveform phase, stop
//! angle and footstep strike angle in the asset data is authored in degrees.

/// Full turn in degrees
pub const FULL_TURN: f32 = 360.0;

/// Wrap an angle into `[0, 360)`.
///
/// Works for negative input and for input more than one turn away.
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360.0 for tiny negative input
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Whether `angle` lies strictly inside `(target - tolerance, target + tolerance)`.
#[inline]
pub fn within(angle: f32, target: f32, tolerance: f32) -> bool {
    angle > target - tolerance && angle < target + tolerance
}

/// Shortest unsigned distance between two angles, in `[0, 180]`.
#[inline]
pub fn angle_between(a: f32, b: f32) -> f32 {
    let d = wrap_degrees(a - b);
    d.min(FULL_TURN - d)
}
