//! Periodic waveform synthesis for joint curves.
//!
//! Geometric shapes are built additively from sine partials, so the same
//! channel can be sharpened or softened just by changing its harmonic count.

use serde::{Deserialize, Serialize};

/// Shape of a periodic channel, evaluated at a phase in radians.
///
/// For the additive shapes, `harmonics` counts the partials summed above the
/// fundamental, so `harmonics: 0` is a pure sine for all three.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveshape {
    #[default]
    Sine,
    Sawtooth { harmonics: u32 },
    Triangle { harmonics: u32 },
    Square { harmonics: u32 },
    /// Fourier series `Σ magnitudes[n] · cos(n·θ − phase_angles[n])`.
    Harmonics {
        magnitudes: Vec<f32>,
        phase_angles: Vec<f32>,
    },
}

impl Waveshape {
    /// Sample the shape at `theta` radians.
    pub fn sample(&self, theta: f32) -> f32 {
        match self {
            Waveshape::Sine => theta.sin(),
            Waveshape::Sawtooth { harmonics } => {
                // All partials at 1/n
                (1..=harmonics + 1)
                    .map(|n| (n as f32 * theta).sin() / n as f32)
                    .sum()
            }
            Waveshape::Square { harmonics } => {
                // Odd partials at 1/n
                (0..=*harmonics)
                    .map(|k| 2 * k + 1)
                    .map(|n| (n as f32 * theta).sin() / n as f32)
                    .sum()
            }
            Waveshape::Triangle { harmonics } => {
                // Odd partials at 1/n², every other one inverted
                (0..=*harmonics)
                    .map(|k| {
                        let n = (2 * k + 1) as f32;
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * (n * theta).sin() / (n * n)
                    })
                    .sum()
            }
            Waveshape::Harmonics { magnitudes, phase_angles } => magnitudes
                .iter()
                .enumerate()
                .map(|(n, magnitude)| {
                    let phase = phase_angles.get(n).copied().unwrap_or(0.0);
                    magnitude * (n as f32 * theta - phase).cos()
                })
                .sum(),
        }
    }
}

fn default_frequency() -> f32 {
    1.0
}

/// One animated channel: `amplitude · shape(wheel · frequency + phase) + offset`.
///
/// `phase` is in degrees and `frequency` multiplies the wheel position, so a
/// frequency of 2 completes two periods per gait cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    #[serde(default)]
    pub amplitude: f32,
    #[serde(default)]
    pub phase: f32,
    #[serde(default)]
    pub offset: f32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default)]
    pub shape: Waveshape,
}

impl Oscillator {
    /// Sine channel with unit frequency.
    pub fn sine(amplitude: f32, phase: f32, offset: f32) -> Self {
        Self {
            amplitude,
            phase,
            offset,
            frequency: 1.0,
            shape: Waveshape::Sine,
        }
    }

    /// Flat channel that always evaluates to zero.
    pub fn zero() -> Self {
        Self {
            amplitude: 0.0,
            phase: 0.0,
            offset: 0.0,
            frequency: 0.0,
            shape: Waveshape::Sine,
        }
    }

    pub fn with_shape(mut self, shape: Waveshape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Evaluate at a wheel position in degrees.
    pub fn evaluate(&self, wheel_degrees: f32) -> f32 {
        let theta = (wheel_degrees * self.frequency + self.phase).to_radians();
        self.amplitude * self.shape.sample(theta) + self.offset
    }

    /// Add `weight` times `source`'s scalar parameters into this channel.
    pub fn accumulate(&mut self, source: &Oscillator, weight: f32) {
        self.amplitude += weight * source.amplitude;
        self.phase += weight * source.phase;
        self.offset += weight * source.offset;
        self.frequency += weight * source.frequency;
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::sine(0.0, 0.0, 0.0)
    }
}
