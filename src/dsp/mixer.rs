//! Mixer: sums voice outputs through the shared master gain.

/// Clamp a requested gain to [0, 1]. NaN is treated as silence.
pub fn clamp_gain(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// The master bus every voice is connected to.
#[derive(Debug, Clone)]
pub struct Mixer {
    master_gain: f64,
}

impl Mixer {
    pub fn new(master_gain: f64) -> Self {
        Mixer {
            master_gain: clamp_gain(master_gain),
        }
    }

    pub fn master_gain(&self) -> f64 {
        self.master_gain
    }

    /// Apply a new master gain; returns the value actually applied.
    pub fn set_master_gain(&mut self, level: f64) -> f64 {
        self.master_gain = clamp_gain(level);
        self.master_gain
    }

    /// Scale a summed voice sample by the master gain and clip to the output range.
    pub fn output(&self, sum: f64) -> f32 {
        (sum * self.master_gain).clamp(-1.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_is_clamped() {
        let mut m = Mixer::new(0.3);
        assert_eq!(m.set_master_gain(-2.0), 0.0);
        assert_eq!(m.set_master_gain(1.7), 1.0);
        assert_eq!(m.set_master_gain(0.45), 0.45);
        assert_eq!(m.set_master_gain(f64::NAN), 0.0);
        assert_eq!(Mixer::new(5.0).master_gain(), 1.0);
    }

    #[test]
    fn output_scales_and_clips() {
        let m = Mixer::new(0.5);
        assert!((m.output(0.8) - 0.4).abs() < 1e-6);
        assert_eq!(m.output(10.0), 1.0);
        assert_eq!(m.output(-10.0), -1.0);
    }
}
