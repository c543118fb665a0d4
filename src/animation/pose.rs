//! Pose evaluation: waveform synthesis at a wheel position.

use glam::Vec3;

use super::definition::AnimationCurves;
use super::joint::Joint;

/// Largest hips offset, per axis, the skeleton accepts.
pub const MAX_HIPS_OFFSET: f32 = 1.0;

/// Rotation of `joint` at `wheel_degrees`, as degrees about (x, y, z).
///
/// Joints the animation does not define stay at identity.
pub fn evaluate_rotation(curves: &AnimationCurves, joint: Joint, wheel_degrees: f32) -> Vec3 {
    match curves.joint(joint) {
        Some(c) => Vec3::new(
            c.pitch.evaluate(wheel_degrees),
            c.yaw.evaluate(wheel_degrees),
            c.roll.evaluate(wheel_degrees),
        ),
        None => Vec3::ZERO,
    }
}

/// Hips translation at `wheel_degrees`.
pub fn evaluate_translation(curves: &AnimationCurves, wheel_degrees: f32) -> Vec3 {
    let t = &curves.hips_translation;
    Vec3::new(
        t.sway.evaluate(wheel_degrees),
        t.bob.evaluate(wheel_degrees),
        t.thrust.evaluate(wheel_degrees),
    )
}

/// Hips offset produced by leaning the body `lean_pitch` / `lean_roll`
/// degrees about the feet.
pub fn lean_offset(hips_to_feet: f32, lean_pitch: f32, lean_roll: f32) -> Vec3 {
    Vec3::new(
        hips_to_feet * lean_roll.to_radians().sin(),
        0.0,
        hips_to_feet * lean_pitch.to_radians().sin(),
    )
}

/// Clamp each axis of a hips offset to `±MAX_HIPS_OFFSET`.
pub fn clamp_hips_translation(translation: Vec3) -> Vec3 {
    translation.clamp(Vec3::splat(-MAX_HIPS_OFFSET), Vec3::splat(MAX_HIPS_OFFSET))
}

/// Add lean to the base hips rotation. Pitch goes about x, roll about z.
pub fn apply_lean_rotation(rotation: Vec3, lean_pitch: f32, lean_roll: f32) -> Vec3 {
    rotation + Vec3::new(lean_pitch, 0.0, lean_roll)
}
