//! Runtime configuration, loadable from JSON handed over by the page.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Synthesizer and output device settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthConfig {
    /// Sample rate requested from the host, in Hz.
    pub sample_rate: f64,
    /// Master gain applied when the device is first constructed.
    pub master_gain: f64,
    /// Seed for snare/hi-hat noise buffers.
    pub noise_seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: 44100.0,
            master_gain: 0.3,
            noise_seed: 0,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate >= 3000.0) {
            return Err(invalid("sampleRate", format!("{} Hz is not a usable rate", self.sample_rate)));
        }
        if !(0.0..=1.0).contains(&self.master_gain) {
            return Err(invalid("masterGain", format!("{} is outside [0, 1]", self.master_gain)));
        }
        Ok(())
    }
}

/// Timing constants of the bouncing-sphere scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimatorConfig {
    /// How long a selected sphere stays highlighted, in ms.
    pub active_window_ms: f64,
    /// Note length played on a wall bounce, in seconds.
    pub bounce_tone_secs: f64,
    /// Note length played when a sphere is selected, in seconds.
    pub select_tone_secs: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        AnimatorConfig {
            active_window_ms: 200.0,
            bounce_tone_secs: 0.2,
            select_tone_secs: 0.5,
        }
    }
}

impl AnimatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("activeWindowMs", self.active_window_ms),
            ("bounceToneSecs", self.bounce_tone_secs),
            ("selectToneSecs", self.select_tone_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("{value} must be a positive number")));
            }
        }
        Ok(())
    }
}

/// Which play area the scene runs in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AreaConfig {
    /// Flat scene in percent of the container, bounds [5, 95].
    #[default]
    Percent,
    /// 3D scene spanning the camera viewport.
    Viewport { width: f64, height: f64 },
}

/// Everything the page passes when it mounts the toy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudioConfig {
    pub synth: SynthConfig,
    pub animator: AnimatorConfig,
    pub area: AreaConfig,
    /// Seed for initial sphere placement.
    pub placement_seed: u64,
}

impl StudioConfig {
    /// Parse and validate. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: StudioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.synth.validate()?;
        self.animator.validate()?;
        if let AreaConfig::Viewport { width, height } = self.area {
            if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
                return Err(invalid("area", format!("viewport {width}x{height} must be positive")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
