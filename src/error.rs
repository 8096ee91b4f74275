use thiserror::Error;

/// Crate-level error. Only configuration and lookups surface errors; audio
/// failures degrade to silence inside the synthesizer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Why an audio device could not be brought to the running state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("host rejected resume: {0}")]
    ResumeRejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Unknown names handed in from the JS side.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unknown waveform '{0}'")]
    Waveform(String),
    #[error("unknown drum '{0}'")]
    Drum(String),
    #[error("unknown scale mode '{0}'")]
    ScaleMode(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("no entity with id {id} (roster has {len})")]
    UnknownEntity { id: usize, len: usize },
}
