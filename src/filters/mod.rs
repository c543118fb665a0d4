//! Stateful signal filters and response curves.
//!
//! Every smoothed signal owns its own filter instance; filters are updated
//! once per tick in a fixed order and never shared between signals.

pub mod averaging;
pub mod butterworth;
pub mod easing;

pub use averaging::AveragingFilter;
pub use butterworth::ButterworthFilter;
pub use easing::CubicEase;
