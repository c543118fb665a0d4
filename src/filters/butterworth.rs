//! Second-order low-pass Butterworth filter.

/// 2nd order low-pass Butterworth filter with unity DC gain.
///
/// Coefficients are for a 2 Hz cutoff at the nominal 60 Hz tick rate. Each
/// smoothed signal owns its own instance; state is the last three inputs and
/// outputs.
#[derive(Clone, Debug)]
pub struct ButterworthFilter {
    gain: f32,
    coeff_one: f32,
    coeff_two: f32,
    xv: [f32; 3],
    yv: [f32; 3],
}

impl ButterworthFilter {
    /// Create a filter at rest (all history zero).
    pub fn new() -> Self {
        Self {
            gain: 104.978_474,
            coeff_one: -0.743_655_2,
            coeff_two: 1.705_552_1,
            xv: [0.0; 3],
            yv: [0.0; 3],
        }
    }

    /// Feed the next input sample and return the filtered output.
    pub fn process(&mut self, input: f32) -> f32 {
        self.xv = [self.xv[1], self.xv[2], input / self.gain];
        let next = (self.xv[0] + self.xv[2])
            + 2.0 * self.xv[1]
            + self.coeff_one * self.yv[1]
            + self.coeff_two * self.yv[2];
        self.yv = [self.yv[1], self.yv[2], next];
        next
    }

    /// Most recent output.
    #[inline]
    pub fn output(&self) -> f32 {
        self.yv[2]
    }

    /// Clear all history.
    pub fn reset(&mut self) {
        self.xv = [0.0; 3];
        self.yv = [0.0; 3];
    }
}

impl Default for ButterworthFilter {
    fn default() -> Self {
        Self::new()
    }
}
