//! Animation data: per-joint curves plus calibration scalars.

use serde::{Deserialize, Serialize};

use super::joint::{Joint, JointTable};
use super::waveform::Oscillator;

/// Rotation curves for one joint, in degrees about each local axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointCurves {
    #[serde(default)]
    pub pitch: Oscillator,
    #[serde(default)]
    pub yaw: Oscillator,
    #[serde(default)]
    pub roll: Oscillator,
}

impl JointCurves {
    pub fn new(pitch: Oscillator, yaw: Oscillator, roll: Oscillator) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn zero() -> Self {
        Self::new(Oscillator::zero(), Oscillator::zero(), Oscillator::zero())
    }
}

/// Hips translation curves: sway (x), bob (y) and thrust (z).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationCurves {
    #[serde(default)]
    pub sway: Oscillator,
    #[serde(default)]
    pub bob: Oscillator,
    #[serde(default)]
    pub thrust: Oscillator,
}

impl TranslationCurves {
    pub fn zero() -> Self {
        Self {
            sway: Oscillator::zero(),
            bob: Oscillator::zero(),
            thrust: Oscillator::zero(),
        }
    }
}

/// Per-animation calibration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationCalibration {
    /// Intrinsic wheel rate in radians per second, used when the wheel is
    /// not driven by ground speed.
    #[serde(default)]
    pub frequency: f32,
    /// Distance between the feet at full stride (walks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride_length: Option<f32>,
    /// Wheel angle at which the stride is widest (walks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride_max_at: Option<f32>,
}

/// The evaluable content of an animation: calibration and curves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationCurves {
    #[serde(default)]
    pub calibration: AnimationCalibration,
    #[serde(default)]
    pub joints: JointTable<JointCurves>,
    #[serde(default)]
    pub hips_translation: TranslationCurves,
}

impl AnimationCurves {
    pub fn joint(&self, joint: Joint) -> Option<&JointCurves> {
        self.joints.get(joint)
    }
}

/// Read-only animation template.
///
/// Templates are loaded once and never mutated; anything that needs a
/// writable animation copies one into a [`BlendBuffer`](super::BlendBuffer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationDefinition {
    name: String,
    #[serde(flatten)]
    curves: AnimationCurves,
}

impl AnimationDefinition {
    pub fn new(name: impl Into<String>, curves: AnimationCurves) -> Self {
        Self {
            name: name.into(),
            curves,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn curves(&self) -> &AnimationCurves {
        &self.curves
    }

    #[inline]
    pub fn calibration(&self) -> &AnimationCalibration {
        &self.curves.calibration
    }
}
