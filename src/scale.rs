//! Equal-tempered scale generation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Scale modes available to the music toys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Major,
    Minor,
    Pentatonic,
}

impl ScaleMode {
    /// Semitone offsets from the root.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ScaleMode::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleMode::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleMode::Pentatonic => &[0, 2, 4, 7, 9],
        }
    }
}

impl FromStr for ScaleMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(ScaleMode::Major),
            "minor" => Ok(ScaleMode::Minor),
            "pentatonic" => Ok(ScaleMode::Pentatonic),
            other => Err(ParseError::ScaleMode(other.to_string())),
        }
    }
}

/// Shift a frequency by `semitones` in 12-TET: `freq * 2^(semitones / 12)`.
pub fn transpose(frequency: f64, semitones: i32) -> f64 {
    frequency * (2.0_f64).powf(semitones as f64 / 12.0)
}

/// Frequencies of one octave of `mode` starting at `root` Hz.
pub fn generate_scale(root: f64, mode: ScaleMode) -> Vec<f64> {
    mode.intervals()
        .iter()
        .map(|&semitones| transpose(root, semitones))
        .collect()
}
