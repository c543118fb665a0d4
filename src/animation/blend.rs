//! Mutable animation buffers for copying and additive blending.

use super::definition::{AnimationCurves, AnimationDefinition, JointCurves, TranslationCurves};
use super::joint::Joint;

/// A writable animation that receives copies of, or weighted sums of,
/// read-only templates.
///
/// The buffer remembers which template it was last copied from (as an
/// arbitrary caller-chosen tag) so callers can skip redundant copies.
#[derive(Clone, Debug)]
pub struct BlendBuffer<K> {
    name: String,
    curves: AnimationCurves,
    source: Option<K>,
    copies: u32,
    contributions: u32,
}

impl<K: Copy + PartialEq> BlendBuffer<K> {
    /// Empty buffer holding the identity pose.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            curves: AnimationCurves::default(),
            source: None,
            copies: 0,
            contributions: 0,
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

    /// Tag of the template last copied in, if the buffer still holds a copy.
    #[inline]
    pub fn source(&self) -> Option<K> {
        self.source
    }

    /// Forget the copy tag so the next copy is not skipped.
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// Number of template copies performed since creation.
    #[inline]
    pub fn copy_count(&self) -> u32 {
        self.copies
    }

    /// Mutable stride length, written back when the stride is re-measured.
    pub fn set_stride_length(&mut self, stride_length: f32) {
        self.curves.calibration.stride_length = Some(stride_length);
    }

    /// Value-copy a template into the buffer, tagging it with `key`.
    pub fn copy_from(&mut self, key: K, template: &AnimationDefinition) {
        self.curves = template.curves().clone();
        self.source = Some(key);
        self.copies += 1;
        self.contributions = 1;
    }

    /// Copy only when the buffer does not already hold `key`.
    ///
    /// Returns whether a copy happened.
    pub fn copy_if_changed(&mut self, key: K, template: &AnimationDefinition) -> bool {
        if self.source == Some(key) {
            return false;
        }
        self.copy_from(key, template);
        true
    }

    /// Reset every channel to zero (identity pose) ahead of blending.
    ///
    /// All joints of the buffer's previous content are kept present so the
    /// output joint set stays stable across ticks.
    pub fn zero(&mut self) {
        for (_, curves) in self.curves.joints.iter_mut() {
            *curves = JointCurves::zero();
        }
        self.curves.hips_translation = TranslationCurves::zero();
        self.curves.calibration.frequency = 0.0;
        self.source = None;
        self.contributions = 0;
    }

    /// Add `weight` times `template`'s channels into the buffer.
    ///
    /// Amplitudes, phases, offsets, frequency multipliers and the intrinsic
    /// wheel frequency are summed. Waveshapes are taken from the first
    /// template blended in after a [`zero`](Self::zero).
    pub fn blend(&mut self, template: &AnimationDefinition, weight: f32) {
        let first = self.contributions == 0;
        let source = template.curves();

        for joint in Joint::ALL {
            let Some(src) = source.joints.get(joint) else {
                continue;
            };
            if !self.curves.joints.contains(joint) {
                self.curves.joints.insert(joint, JointCurves::zero());
            }
            if let Some(dst) = self.curves.joints.get_mut(joint) {
                dst.pitch.accumulate(&src.pitch, weight);
                dst.yaw.accumulate(&src.yaw, weight);
                dst.roll.accumulate(&src.roll, weight);
                if first {
                    dst.pitch.shape = src.pitch.shape.clone();
                    dst.yaw.shape = src.yaw.shape.clone();
                    dst.roll.shape = src.roll.shape.clone();
                }
            }
        }

        let dst = &mut self.curves.hips_translation;
        let src = &source.hips_translation;
        dst.sway.accumulate(&src.sway, weight);
        dst.bob.accumulate(&src.bob, weight);
        dst.thrust.accumulate(&src.thrust, weight);
        if first {
            dst.sway.shape = src.sway.shape.clone();
            dst.bob.shape = src.bob.shape.clone();
            dst.thrust.shape = src.thrust.shape.clone();
        }

        self.curves.calibration.frequency += weight * source.calibration.frequency;
        self.contributions += 1;
    }
}
