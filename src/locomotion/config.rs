//! Locomotion thresholds and transition parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationKind;
use crate::core::{Error, Result};
use crate::filters::CubicEase;

/// Duration and easing of a cross-blend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionParameters {
    /// Seconds from start to completion.
    pub duration: f32,
    /// Easing applied to the blend factor.
    #[serde(default)]
    pub easing: CubicEase,
}

impl Default for TransitionParameters {
    fn default() -> Self {
        Self {
            duration: 0.5,
            easing: CubicEase::SMOOTHSTEP,
        }
    }
}

/// Parameters for cross-blends between two kinds of animation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub from: AnimationKind,
    pub to: AnimationKind,
    pub parameters: TransitionParameters,
}

/// Transition parameter table with a fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub default: TransitionParameters,
    pub rules: Vec<TransitionRule>,
}

impl TransitionConfig {
    /// Parameters for blending from `from` into `to`.
    pub fn parameters(&self, from: AnimationKind, to: AnimationKind) -> TransitionParameters {
        self.rules
            .iter()
            .find(|rule| rule.from == from && rule.to == to)
            .map(|rule| rule.parameters)
            .unwrap_or(self.default)
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        let rule = |from, to, duration| TransitionRule {
            from,
            to,
            parameters: TransitionParameters {
                duration,
                easing: CubicEase::SMOOTHSTEP,
            },
        };
        Self {
            default: TransitionParameters::default(),
            rules: vec![
                // Starting to walk should bite quickly; stopping settles slower
                rule(AnimationKind::Idle, AnimationKind::Walk, 0.35),
                rule(AnimationKind::Walk, AnimationKind::Idle, 0.6),
                rule(AnimationKind::Walk, AnimationKind::Fly, 0.75),
                rule(AnimationKind::Fly, AnimationKind::Walk, 0.4),
                rule(AnimationKind::Hover, AnimationKind::Idle, 0.3),
            ],
        }
    }
}

/// Footstep volume shaping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootstepConfig {
    /// Below this speed footsteps play at `min_volume`.
    pub speed_threshold: f32,
    /// Volume per unit of normalised walking speed.
    pub volume_attenuation: f32,
    pub min_volume: f32,
}

impl Default for FootstepConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 0.4,
            volume_attenuation: 0.8,
            min_volume: 0.5,
        }
    }
}

/// All locomotion tunables. Fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Speed above which the avatar counts as moving (m/s).
    pub move_threshold: f32,
    /// Peak walking speed, by observation (m/s).
    pub max_walk_speed: f32,
    /// Largest wheel advance per tick (degrees) before it is discarded.
    pub max_wheel_increment: f32,
    /// Speed that maps to full lean.
    pub top_speed: f32,
    /// Directed acceleration that counts as starting to move.
    pub acceleration_threshold: f32,
    /// Directed acceleration that counts as walking to a stop.
    pub deceleration_threshold: f32,
    /// Directed acceleration that counts as flying to a stop.
    pub fast_deceleration_threshold: f32,
    /// Vertical acceleration treated as landing bounce noise.
    pub bounce_acceleration_threshold: f32,
    /// Ticks after landing during which bounce noise is ignored.
    pub bounce_window_ticks: u32,
    /// Height above the surface below which gravity dominates (m).
    pub gravity_threshold: f32,
    /// Upward speed that overcomes gravity (m/s).
    pub overcome_gravity_speed: f32,
    /// Height below which a descending avatar prepares to land (m).
    pub landing_threshold: f32,
    /// Height below which the avatar counts as on the surface (m).
    pub on_surface_threshold: f32,
    /// Maximum length of a nested transition chain.
    pub max_transition_recursion: usize,
    /// Window of the fly blend weight damping filters (ticks).
    pub fly_blend_damping: usize,
    /// Frames kept in the motion history.
    pub history_length: usize,
    /// How strongly forward motion wins over sideways motion when picking a
    /// direction. Prevents false side-steps while banking.
    pub forward_bias: f32,
    /// Fraction of `max_walk_speed` required before stride is re-measured.
    pub stride_sample_speed_ratio: f32,
    /// Wheel window (degrees) around the stride-max angle for measuring.
    pub stride_sample_tolerance: f32,
    pub transitions: TransitionConfig,
    pub footsteps: FootstepConfig,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_threshold: 0.075,
            max_walk_speed: 2.9,
            max_wheel_increment: 25.0,
            top_speed: 300.0,
            acceleration_threshold: 0.2,
            deceleration_threshold: -6.0,
            fast_deceleration_threshold: -150.0,
            bounce_acceleration_threshold: 25.0,
            bounce_window_ticks: 10,
            gravity_threshold: 3.0,
            overcome_gravity_speed: 0.5,
            landing_threshold: 0.35,
            on_surface_threshold: 0.1,
            max_transition_recursion: 10,
            fly_blend_damping: 50,
            history_length: 8,
            forward_bias: 100.0,
            stride_sample_speed_ratio: 0.97,
            stride_sample_tolerance: 1.0,
            transitions: TransitionConfig::default(),
            footsteps: FootstepConfig::default(),
        }
    }
}

impl LocomotionConfig {
    /// Load and validate a config from a JSON file. Missing fields take their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_transition_recursion == 0 {
            return Err(Error::InvalidConfig("max_transition_recursion must be at least 1".into()));
        }
        if self.fly_blend_damping == 0 {
            return Err(Error::InvalidConfig("fly_blend_damping must be at least 1".into()));
        }
        if self.history_length == 0 {
            return Err(Error::InvalidConfig("history_length must be at least 1".into()));
        }
        if !(self.max_walk_speed > 0.0 && self.top_speed > 0.0) {
            return Err(Error::InvalidConfig("speeds must be positive".into()));
        }
        if !(self.max_wheel_increment > 0.0) {
            return Err(Error::InvalidConfig("max_wheel_increment must be positive".into()));
        }
        let durations = std::iter::once(self.transitions.default.duration)
            .chain(self.transitions.rules.iter().map(|r| r.parameters.duration));
        for duration in durations {
            if !(duration > 0.0 && duration.is_finite()) {
                return Err(Error::InvalidConfig(format!(
                    "transition duration must be positive, got {duration}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LocomotionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_transition_lookup() {
        let config = TransitionConfig::default();
        let p = config.parameters(AnimationKind::Idle, AnimationKind::Walk);
        assert!((p.duration - 0.35).abs() < 1e-6);
        let fallback = config.parameters(AnimationKind::Fly, AnimationKind::Hover);
        assert_eq!(fallback, config.default);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LocomotionConfig =
            serde_json::from_str(r#"{ "max_transition_recursion": 3 }"#).unwrap();
        assert_eq!(config.max_transition_recursion, 3);
        assert_eq!(config.max_wheel_increment, 25.0);
        assert_eq!(config.footsteps, FootstepConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let mut config = LocomotionConfig::default();
        config.transitions.default.duration = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locomotion.json");
        std::fs::write(&path, r#"{ "fly_blend_damping": 0 }"#).unwrap();
        assert!(matches!(LocomotionConfig::load(&path), Err(Error::InvalidConfig(_))));

        std::fs::write(&path, r#"{ "top_speed": 150.0 }"#).unwrap();
        let config = LocomotionConfig::load(&path).unwrap();
        assert_eq!(config.top_speed, 150.0);
    }
}
