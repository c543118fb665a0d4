//! Built-in procedural avatar.
//!
//! A compact, hand-tuned gait set so a session can run without external
//! asset files.

use super::assets::{AvatarAssets, AvatarOptions, Calibration};
use super::definition::{AnimationCalibration, AnimationCurves, AnimationDefinition, JointCurves};
use super::joint::Joint;
use super::waveform::{Oscillator, Waveshape};

fn sine(amplitude: f32, phase: f32, offset: f32) -> Oscillator {
    Oscillator::sine(amplitude, phase, offset)
}

fn still(offset: f32) -> Oscillator {
    Oscillator::sine(0.0, 0.0, offset)
}

fn set(curves: &mut AnimationCurves, joint: Joint, pitch: Oscillator, yaw: Oscillator, roll: Oscillator) {
    curves.joints.insert(joint, JointCurves::new(pitch, yaw, roll));
}

fn calibration(frequency: f32, stride: Option<(f32, f32)>) -> AnimationCalibration {
    AnimationCalibration {
        frequency,
        stride_length: stride.map(|(length, _)| length),
        stride_max_at: stride.map(|(_, at)| at),
    }
}

/// Arms hanging at the sides with an optional swing.
fn arms(curves: &mut AnimationCurves, swing: f32, swing_phase: f32, hang: f32) {
    set(curves, Joint::RightShoulder, still(0.0), still(0.0), still(0.0));
    set(curves, Joint::LeftShoulder, still(0.0), still(0.0), still(0.0));
    set(curves, Joint::RightArm, sine(swing, swing_phase + 180.0, 0.0), still(0.0), still(hang));
    set(curves, Joint::LeftArm, sine(swing, swing_phase, 0.0), still(0.0), still(-hang));
    set(curves, Joint::RightForeArm, sine(swing * 0.5, swing_phase + 180.0, -10.0), still(0.0), still(0.0));
    set(curves, Joint::LeftForeArm, sine(swing * 0.5, swing_phase, -10.0), still(0.0), still(0.0));
    set(curves, Joint::RightHand, still(0.0), still(0.0), still(0.0));
    set(curves, Joint::LeftHand, still(0.0), still(0.0), still(0.0));
}

fn idle() -> AnimationDefinition {
    let mut c = AnimationCurves {
        calibration: calibration(1.5, None),
        ..Default::default()
    };
    c.hips_translation.bob = sine(0.005, 0.0, 0.0);
    set(&mut c, Joint::Hips, still(0.0), still(0.0), still(0.0));
    set(&mut c, Joint::Spine, sine(0.8, 0.0, 0.0), still(0.0), still(0.0));
    set(&mut c, Joint::Spine1, sine(0.6, 30.0, 0.0), still(0.0), still(0.0));
    set(&mut c, Joint::Spine2, sine(0.4, 60.0, 0.0), still(0.0), still(0.0));
    for joint in [Joint::RightUpLeg, Joint::LeftUpLeg, Joint::RightLeg, Joint::LeftLeg, Joint::RightFoot, Joint::LeftFoot] {
        set(&mut c, joint, still(0.0), still(0.0), still(0.0));
    }
    set(&mut c, Joint::Neck, still(0.0), still(0.0), still(0.0));
    set(&mut c, Joint::Head, sine(1.0, 90.0, 0.0), sine(2.0, 0.0, 0.0).with_frequency(0.5), still(0.0));
    arms(&mut c, 1.0, 0.0, 72.0);
    AnimationDefinition::new("idle", c)
}

fn hover() -> AnimationDefinition {
    let mut c = AnimationCurves {
        calibration: calibration(2.0, None),
        ..Default::default()
    };
    c.hips_translation.bob = sine(0.02, 0.0, 0.0);
    set(&mut c, Joint::Hips, sine(1.0, 0.0, 0.0), still(0.0), still(0.0));
    set(&mut c, Joint::Spine, sine(1.5, 0.0, 0.0), still(0.0), still(0.0));
    set(&mut c, Joint::RightUpLeg, sine(5.0, 0.0, 12.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftUpLeg, sine(5.0, 40.0, 8.0), still(0.0), still(0.0));
    set(&mut c, Joint::RightLeg, sine(6.0, 20.0, -25.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftLeg, sine(6.0, 60.0, -20.0), still(0.0), still(0.0));
    set(&mut c, Joint::RightFoot, still(20.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftFoot, still(20.0), still(0.0), still(0.0));
    set(&mut c, Joint::Head, sine(2.0, 90.0, 0.0), still(0.0), still(0.0));
    arms(&mut c, 4.0, 0.0, 60.0);
    AnimationDefinition::new("hover", c)
}

/// Forward or backward walk. Backwards plays the leg cycle in reverse.
fn walk(name: &str, reverse: bool) -> AnimationDefinition {
    let dir = if reverse { 180.0 } else { 0.0 };
    let mut c = AnimationCurves {
        calibration: calibration(5.0, Some((if reverse { 0.6 } else { 0.9 }, 90.0))),
        ..Default::default()
    };
    c.hips_translation.sway = sine(0.02, dir, 0.0);
    c.hips_translation.bob = sine(0.025, 90.0, 0.0).with_frequency(2.0);
    c.hips_translation.thrust = sine(0.01, 0.0, 0.0).with_frequency(2.0);

    set(&mut c, Joint::Hips, sine(2.0, 0.0, 2.0).with_frequency(2.0), sine(4.0, dir, 0.0), sine(2.0, 90.0 + dir, 0.0));
    set(&mut c, Joint::Spine, still(0.0), sine(3.0, 180.0 + dir, 0.0), still(0.0));
    set(&mut c, Joint::Spine1, still(0.0), sine(2.0, 180.0 + dir, 0.0), still(0.0));
    set(&mut c, Joint::Spine2, still(0.0), sine(1.0, 180.0 + dir, 0.0), still(0.0));
    set(&mut c, Joint::RightUpLeg, sine(25.0, dir, -5.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftUpLeg, sine(25.0, 180.0 + dir, -5.0), still(0.0), still(0.0));
    let knee = Waveshape::Triangle { harmonics: 3 };
    set(&mut c, Joint::RightLeg, sine(20.0, 90.0 + dir, 25.0).with_shape(knee.clone()), still(0.0), still(0.0));
    set(&mut c, Joint::LeftLeg, sine(20.0, 270.0 + dir, 25.0).with_shape(knee), still(0.0), still(0.0));
    set(&mut c, Joint::RightFoot, sine(10.0, 180.0 + dir, 0.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftFoot, sine(10.0, dir, 0.0), still(0.0), still(0.0));
    set(&mut c, Joint::RightToeBase, sine(8.0, 270.0 + dir, 5.0).with_shape(Waveshape::Sawtooth { harmonics: 2 }), still(0.0), still(0.0));
    set(&mut c, Joint::LeftToeBase, sine(8.0, 90.0 + dir, 5.0).with_shape(Waveshape::Sawtooth { harmonics: 2 }), still(0.0), still(0.0));
    set(&mut c, Joint::Neck, still(0.0), sine(1.0, dir, 0.0), still(0.0));
    set(&mut c, Joint::Head, still(0.0), sine(1.0, dir, 0.0), still(0.0));
    arms(&mut c, 15.0, dir, 72.0);
    AnimationDefinition::new(name, c)
}

/// Side step. `side` is +1 for right, -1 for left.
fn side_step(name: &str, side: f32) -> AnimationDefinition {
    let lead = if side > 0.0 { 0.0 } else { 180.0 };
    let mut c = AnimationCurves {
        calibration: calibration(5.0, Some((0.5, 90.0))),
        ..Default::default()
    };
    c.hips_translation.sway = sine(0.03, lead, 0.0);
    c.hips_translation.bob = sine(0.015, 90.0, 0.0).with_frequency(2.0);
    set(&mut c, Joint::Hips, still(0.0), still(0.0), sine(3.0, lead, 0.0));
    set(&mut c, Joint::Spine, still(0.0), still(0.0), sine(2.0, lead + 180.0, 0.0));
    set(&mut c, Joint::RightUpLeg, still(-3.0), still(0.0), sine(12.0, lead, 0.0));
    set(&mut c, Joint::LeftUpLeg, still(-3.0), still(0.0), sine(12.0, lead, 0.0));
    set(&mut c, Joint::RightLeg, sine(10.0, 90.0, 12.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftLeg, sine(10.0, 270.0, 12.0), still(0.0), still(0.0));
    set(&mut c, Joint::RightFoot, still(0.0), still(0.0), sine(6.0, lead + 180.0, 0.0));
    set(&mut c, Joint::LeftFoot, still(0.0), still(0.0), sine(6.0, lead + 180.0, 0.0));
    set(&mut c, Joint::Head, still(0.0), still(0.0), sine(1.0, lead + 180.0, 0.0));
    arms(&mut c, 3.0, 0.0, 70.0);
    AnimationDefinition::new(name, c)
}

/// Flight pose. `lean` pitches the body, `tuck` bends the legs.
fn fly(name: &str, lean: f32, tuck: f32, arm_spread: f32) -> AnimationDefinition {
    let mut c = AnimationCurves {
        calibration: calibration(3.0, None),
        ..Default::default()
    };
    c.hips_translation.bob = sine(0.03, 0.0, 0.0);
    set(&mut c, Joint::Hips, sine(1.5, 0.0, lean), still(0.0), still(0.0));
    set(&mut c, Joint::Spine, sine(2.0, 30.0, lean * 0.3), still(0.0), still(0.0));
    set(&mut c, Joint::RightUpLeg, sine(4.0, 0.0, tuck), still(0.0), still(0.0));
    set(&mut c, Joint::LeftUpLeg, sine(4.0, 180.0, tuck), still(0.0), still(0.0));
    set(&mut c, Joint::RightLeg, sine(5.0, 60.0, -tuck * 1.5), still(0.0), still(0.0));
    set(&mut c, Joint::LeftLeg, sine(5.0, 240.0, -tuck * 1.5), still(0.0), still(0.0));
    set(&mut c, Joint::RightFoot, still(25.0), still(0.0), still(0.0));
    set(&mut c, Joint::LeftFoot, still(25.0), still(0.0), still(0.0));
    set(&mut c, Joint::Head, still(-lean * 0.5), still(0.0), still(0.0));
    arms(&mut c, 5.0, 0.0, arm_spread);
    AnimationDefinition::new(name, c)
}

/// The full built-in asset set.
pub fn procedural_avatar() -> AvatarAssets {
    AvatarAssets {
        calibration: Calibration::default(),
        options: AvatarOptions::default(),
        idle: idle(),
        hover: hover(),
        walk_forwards: walk("walk forwards", false),
        walk_backwards: walk("walk backwards", true),
        side_step_left: side_step("side step left", -1.0),
        side_step_right: side_step("side step right", 1.0),
        fly_up: fly("fly up", -5.0, 5.0, 40.0),
        fly_down: fly("fly down", 5.0, 20.0, 55.0),
        fly_forwards: fly("fly forwards", 45.0, 10.0, 75.0),
        fly_backwards: fly("fly backwards", -20.0, 25.0, 50.0),
    }
}
