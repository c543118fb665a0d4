//! Avatar asset schema and the loaded animation set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::blend::BlendBuffer;
use super::definition::{AnimationCurves, AnimationDefinition};
use crate::core::{Error, Result};

/// Direction variants of the walk templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkDirection {
    Forwards,
    Backwards,
    Left,
    Right,
}

impl WalkDirection {
    pub const ALL: [WalkDirection; 4] = [
        WalkDirection::Forwards,
        WalkDirection::Backwards,
        WalkDirection::Left,
        WalkDirection::Right,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Direction variants of the flight templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlyDirection {
    Up,
    Down,
    Forwards,
    Backwards,
}

impl FlyDirection {
    pub const ALL: [FlyDirection; 4] = [
        FlyDirection::Up,
        FlyDirection::Down,
        FlyDirection::Forwards,
        FlyDirection::Backwards,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Broad category of an animation, used to look up transition parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    Idle,
    Hover,
    Walk,
    Fly,
}

/// Identifies one animation of an [`AnimationSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationId {
    Idle,
    Hover,
    Walk(WalkDirection),
    WalkBlend,
    Fly(FlyDirection),
    FlyBlend,
}

impl AnimationId {
    pub fn kind(self) -> AnimationKind {
        match self {
            AnimationId::Idle => AnimationKind::Idle,
            AnimationId::Hover => AnimationKind::Hover,
            AnimationId::Walk(_) | AnimationId::WalkBlend => AnimationKind::Walk,
            AnimationId::Fly(_) | AnimationId::FlyBlend => AnimationKind::Fly,
        }
    }

    #[inline]
    pub fn is_walk(self) -> bool {
        self.kind() == AnimationKind::Walk
    }

    /// The displayed animation this one feeds: directional templates map to
    /// their blend buffer.
    pub fn family(self) -> AnimationId {
        match self {
            AnimationId::Walk(_) => AnimationId::WalkBlend,
            AnimationId::Fly(_) => AnimationId::FlyBlend,
            other => other,
        }
    }
}

/// Per-avatar calibration scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Height of the hips above the soles, in metres.
    pub hips_to_feet: f32,
    /// Active stride length. Replaced by the walk template's value on each
    /// direction change and by live measurement while walking.
    pub stride_length: f32,
    /// Maximum forward lean in degrees.
    pub pitch_max: f32,
    /// Maximum bank in degrees.
    pub roll_max: f32,
    /// Yaw change per tick, in degrees, that produces a full bank.
    pub delta_yaw_max: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            hips_to_feet: 1.0,
            stride_length: 0.8,
            pitch_max: 8.0,
            roll_max: 10.0,
            delta_yaw_max: 1.75,
        }
    }
}

/// Avatar-level switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarOptions {
    pub makes_footstep_sounds: bool,
    /// Leave the arm chains to the host (no rotations emitted).
    pub arms_free: bool,
    /// Leave the head chain to the host (no rotations emitted).
    pub head_free: bool,
}

impl Default for AvatarOptions {
    fn default() -> Self {
        Self {
            makes_footstep_sounds: true,
            arms_free: false,
            head_free: false,
        }
    }
}

/// On-disk description of an avatar's animations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvatarAssets {
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub options: AvatarOptions,
    pub idle: AnimationDefinition,
    pub hover: AnimationDefinition,
    pub walk_forwards: AnimationDefinition,
    pub walk_backwards: AnimationDefinition,
    pub side_step_left: AnimationDefinition,
    pub side_step_right: AnimationDefinition,
    pub fly_up: AnimationDefinition,
    pub fly_down: AnimationDefinition,
    pub fly_forwards: AnimationDefinition,
    pub fly_backwards: AnimationDefinition,
}

impl AvatarAssets {
    /// Load and validate assets from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let assets: Self = serde_json::from_str(&json)?;
        assets.validate()?;
        log::info!("Loaded avatar assets from {}", path.display());
        Ok(assets)
    }

    /// Write assets as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject calibration that would make the wheel or lean maths degenerate.
    ///
    /// Missing optional values are fine; they fall back at runtime.
    pub fn validate(&self) -> Result<()> {
        let c = &self.calibration;
        let scalars = [
            ("hips_to_feet", c.hips_to_feet),
            ("stride_length", c.stride_length),
            ("delta_yaw_max", c.delta_yaw_max),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidAsset(format!(
                    "calibration.{name} must be positive, got {value}"
                )));
            }
        }
        for (name, value) in [("pitch_max", c.pitch_max), ("roll_max", c.roll_max)] {
            if !value.is_finite() {
                return Err(Error::InvalidAsset(format!("calibration.{name} is not finite")));
            }
        }

        for def in self.definitions() {
            let cal = def.calibration();
            if !cal.frequency.is_finite() {
                return Err(Error::InvalidAsset(format!(
                    "{}: frequency is not finite",
                    def.name()
                )));
            }
            if let Some(stride) = cal.stride_length {
                if !stride.is_finite() || stride <= 0.0 {
                    return Err(Error::InvalidAsset(format!(
                        "{}: stride_length must be positive, got {stride}",
                        def.name()
                    )));
                }
            }
        }
        Ok(())
    }

    fn definitions(&self) -> [&AnimationDefinition; 10] {
        [
            &self.idle,
            &self.hover,
            &self.walk_forwards,
            &self.walk_backwards,
            &self.side_step_left,
            &self.side_step_right,
            &self.fly_up,
            &self.fly_down,
            &self.fly_forwards,
            &self.fly_backwards,
        ]
    }
}

/// Read-only templates plus the two mutable blend buffers.
#[derive(Clone, Debug)]
pub struct AnimationSet {
    idle: AnimationDefinition,
    hover: AnimationDefinition,
    walks: [AnimationDefinition; 4],
    flights: [AnimationDefinition; 4],
    walk_blend: BlendBuffer<WalkDirection>,
    fly_blend: BlendBuffer<FlyDirection>,
}

impl AnimationSet {
    /// Build the set, splitting the avatar-level settings back out.
    pub fn from_assets(assets: AvatarAssets) -> (Self, Calibration, AvatarOptions) {
        let set = Self {
            idle: assets.idle,
            hover: assets.hover,
            walks: [
                assets.walk_forwards,
                assets.walk_backwards,
                assets.side_step_left,
                assets.side_step_right,
            ],
            flights: [
                assets.fly_up,
                assets.fly_down,
                assets.fly_forwards,
                assets.fly_backwards,
            ],
            walk_blend: BlendBuffer::new("walk blend"),
            fly_blend: BlendBuffer::new("fly blend"),
        };
        (set, assets.calibration, assets.options)
    }

    /// Curves to evaluate for `id`.
    pub fn curves(&self, id: AnimationId) -> &AnimationCurves {
        match id {
            AnimationId::WalkBlend => self.walk_blend.curves(),
            AnimationId::FlyBlend => self.fly_blend.curves(),
            AnimationId::Idle => self.idle.curves(),
            AnimationId::Hover => self.hover.curves(),
            AnimationId::Walk(d) => self.walks[d.index()].curves(),
            AnimationId::Fly(d) => self.flights[d.index()].curves(),
        }
    }

    pub fn name(&self, id: AnimationId) -> &str {
        match id {
            AnimationId::WalkBlend => self.walk_blend.name(),
            AnimationId::FlyBlend => self.fly_blend.name(),
            AnimationId::Idle => self.idle.name(),
            AnimationId::Hover => self.hover.name(),
            AnimationId::Walk(d) => self.walks[d.index()].name(),
            AnimationId::Fly(d) => self.flights[d.index()].name(),
        }
    }

    #[inline]
    pub fn walk(&self, direction: WalkDirection) -> &AnimationDefinition {
        &self.walks[direction.index()]
    }

    #[inline]
    pub fn fly(&self, direction: FlyDirection) -> &AnimationDefinition {
        &self.flights[direction.index()]
    }

    #[inline]
    pub fn walk_blend(&self) -> &BlendBuffer<WalkDirection> {
        &self.walk_blend
    }

    #[inline]
    pub fn fly_blend(&self) -> &BlendBuffer<FlyDirection> {
        &self.fly_blend
    }

    /// Copy the walk template for `direction` into the walk blend buffer
    /// unless it already holds it. Returns whether a copy happened.
    pub fn select_walk(&mut self, direction: WalkDirection) -> bool {
        let template = &self.walks[direction.index()];
        self.walk_blend.copy_if_changed(direction, template)
    }

    /// Stride length stored with the walk blend.
    pub fn walk_blend_stride(&self) -> Option<f32> {
        self.walk_blend.curves().calibration.stride_length
    }

    /// Record a live stride measurement on the walk blend.
    pub fn store_walk_stride(&mut self, stride_length: f32) {
        self.walk_blend.set_stride_length(stride_length);
    }

    /// Mark the walk blend as stale so the next walk re-copies its template.
    pub fn release_walk_blend(&mut self) {
        self.walk_blend.clear_source();
    }

    /// Rebuild the fly blend from weighted templates. Zero weights are skipped;
    /// an all-zero set leaves the identity pose.
    pub fn blend_flight(&mut self, weights: &[(FlyDirection, f32)]) {
        self.fly_blend.zero();
        for &(direction, weight) in weights {
            if weight > 0.0 {
                self.fly_blend.blend(&self.flights[direction.index()], weight);
            }
        }
    }
}
