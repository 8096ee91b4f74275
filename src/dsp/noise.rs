//! White-noise buffers for the snare and hi-hat.

use rand::Rng;

/// A one-shot mono buffer of uniform white noise in [-1, 1].
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Vec<f64>,
    cursor: usize,
}

impl NoiseBuffer {
    /// Fill `seconds` worth of samples at `sample_rate` from `rng`.
    pub fn white<R: Rng + ?Sized>(rng: &mut R, seconds: f64, sample_rate: f64) -> Self {
        let len = (seconds * sample_rate).round().max(0.0) as usize;
        let samples = (0..len).map(|_| rng.random_range(-1.0..=1.0)).collect();
        NoiseBuffer { samples, cursor: 0 }
    }

    /// Next sample, or `None` once the buffer has been played through.
    pub fn next_sample(&mut self) -> Option<f64> {
        let sample = self.samples.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(sample)
    }

    /// Playing time of the whole buffer.
    pub fn duration(&self, sample_rate: f64) -> f64 {
        self.samples.len() as f64 / sample_rate
    }
}
