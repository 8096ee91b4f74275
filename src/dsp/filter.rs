//! Biquad filter with WebAudio `BiquadFilterNode` coefficient semantics.
//!
//! Coefficients follow the Audio EQ Cookbook. As in WebAudio, `q` is a
//! resonance in dB for high-pass and a plain quality factor for band-pass.
//! Those are the two responses the drum voices use.

use std::f64::consts::PI;

/// Filter response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    Highpass,
    Bandpass,
}

/// WebAudio's default `Q`.
pub const DEFAULT_Q: f64 = 1.0;

/// A 2nd-order IIR filter, Direct Form II Transposed.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    filter_type: FilterType,
    frequency: f64,
    q: f64,

    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,
}

impl BiquadFilter {
    pub fn new(filter_type: FilterType, frequency: f64, q: f64, sample_rate: f64) -> Self {
        let mut f = BiquadFilter {
            filter_type,
            frequency,
            q,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        };
        f.update_coefficients(sample_rate);
        f
    }

    pub fn bandpass(center: f64, q: f64, sample_rate: f64) -> Self {
        Self::new(FilterType::Bandpass, center, q, sample_rate)
    }

    pub fn highpass(cutoff: f64, sample_rate: f64) -> Self {
        Self::new(FilterType::Highpass, cutoff, DEFAULT_Q, sample_rate)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    fn update_coefficients(&mut self, sample_rate: f64) {
        // Keep the cutoff strictly inside (0, nyquist)
        let nyquist = sample_rate / 2.0;
        let freq = self.frequency.clamp(1e-3, nyquist * 0.999);
        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::Highpass => {
                let alpha = sin_w0 / (2.0 * db_to_q(self.q));
                let b0 = (1.0 + cos_w0) / 2.0;
                (b0, -(1.0 + cos_w0), b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterType::Bandpass => {
                let alpha = sin_w0 / (2.0 * self.q.max(1e-4));
                (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
        };

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }
}

/// WebAudio treats high-pass `Q` as resonance in dB.
fn db_to_q(db: f64) -> f64 {
    (10.0_f64).powf(db / 20.0)
}
