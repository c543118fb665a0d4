//! Moving-average damping filter.

use std::collections::VecDeque;

/// Fixed-window moving average.
///
/// The window starts full of zeros, so a step input ramps in linearly over
/// `window` samples.
#[derive(Clone, Debug)]
pub struct AveragingFilter {
    past_values: VecDeque<f32>,
}

impl AveragingFilter {
    /// Create a filter averaging over `window` samples (at least one).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            past_values: std::iter::repeat_n(0.0, window).collect(),
        }
    }

    /// Push the next sample and return the window mean.
    pub fn process(&mut self, input: f32) -> f32 {
        self.past_values.pop_front();
        self.past_values.push_back(input);
        self.past_values.iter().sum::<f32>() / self.past_values.len() as f32
    }

    /// Window length in samples.
    #[inline]
    pub fn window(&self) -> usize {
        self.past_values.len()
    }

    /// Refill the window with zeros.
    pub fn reset(&mut self) {
        self.past_values.iter_mut().for_each(|v| *v = 0.0);
    }
}
