//! Cubic response-shaping curves.

use serde::{Deserialize, Serialize};

/// One-dimensional cubic Bezier easing from 0 to 1.
///
/// The end points are fixed at 0 and 1; `p1` and `p2` are the inner control
/// values. `(0, 0)` gives `t³`, `(0, 1)` gives smoothstep and `(1/3, 2/3)` is
/// linear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicEase {
    pub p1: f32,
    pub p2: f32,
}

impl CubicEase {
    /// Identity curve.
    pub const LINEAR: Self = Self { p1: 1.0 / 3.0, p2: 2.0 / 3.0 };
    /// Slow start, fast finish (`t³`).
    pub const EASE_IN_CUBIC: Self = Self { p1: 0.0, p2: 0.0 };
    /// Slow start and finish.
    pub const SMOOTHSTEP: Self = Self { p1: 0.0, p2: 1.0 };

    pub fn new(p1: f32, p2: f32) -> Self {
        Self { p1, p2 }
    }

    /// Evaluate the curve. Input is clamped to `[0, 1]`.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        3.0 * u * u * t * self.p1 + 3.0 * u * t * t * self.p2 + t * t * t
    }

    /// Evaluate with the sign of `t` preserved, for signed progress values.
    pub fn apply_signed(&self, t: f32) -> f32 {
        self.apply(t.abs()).copysign(t)
    }
}

impl Default for CubicEase {
    fn default() -> Self {
        Self::SMOOTHSTEP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_points() {
        for ease in [CubicEase::LINEAR, CubicEase::EASE_IN_CUBIC, CubicEase::SMOOTHSTEP] {
            assert!(ease.apply(0.0).abs() < 1e-6);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_linear_is_identity() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((CubicEase::LINEAR.apply(t) - t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_ease_in_is_subtle_then_pronounced() {
        let ease = CubicEase::EASE_IN_CUBIC;
        assert!((ease.apply(0.5) - 0.125).abs() < 1e-6);
        assert!(ease.apply(0.2) < 0.2 * 0.1);
        assert!(ease.apply(0.9) > 0.7);
    }

    #[test]
    fn test_signed_and_clamped() {
        let ease = CubicEase::EASE_IN_CUBIC;
        assert!((ease.apply_signed(-0.5) + 0.125).abs() < 1e-6);
        assert_eq!(ease.apply(4.0), 1.0);
    }
}
