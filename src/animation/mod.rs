//! Procedural animation data and evaluation
//!
//! Animations are sets of analytic per-joint curves indexed by a phase wheel
//! position. Read-only templates are loaded once; blend buffers receive
//! copies or weighted sums of templates every tick they are in use.

pub mod assets;
pub mod blend;
pub mod definition;
pub mod joint;
pub mod pose;
pub mod presets;
pub mod waveform;

pub use assets::{
    AnimationId, AnimationKind, AnimationSet, AvatarAssets, AvatarOptions, Calibration,
    FlyDirection, WalkDirection,
};
pub use blend::BlendBuffer;
pub use definition::{AnimationCalibration, AnimationCurves, AnimationDefinition, JointCurves, TranslationCurves};
pub use joint::{IkChain, Joint, JointTable};
pub use waveform::{Oscillator, Waveshape};
