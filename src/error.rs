// Error types
// One enum per subsystem so a failure stays terminal for that subsystem only
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to probe file format: {0}")]
    Probe(#[source] symphonia::core::errors::Error),

    #[error("no audio track found")]
    NoTrack,

    #[error("failed to create decoder: {0}")]
    Codec(#[source] symphonia::core::errors::Error),

    #[error("failed to read packet: {0}")]
    Read(#[source] symphonia::core::errors::Error),

    #[error("audio asset contains no samples")]
    Empty,

    #[error("sample rate conversion failed: {0}")]
    Resample(String),

    #[error("no output device available")]
    NoOutputDevice,

    #[error("failed to get default output config: {0}")]
    OutputConfig(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("audio stream error: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("malformed input line: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("invalid value {0:?}")]
    InvalidValue(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("controls disabled: no audio loaded")]
    ControlsDisabled,
}
