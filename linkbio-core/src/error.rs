use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Settings errors
    #[error("Config file not found at {path}. A template has been created - edit it and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Profile document and visit file errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // Audio source errors
    #[error("Playback request rejected: {reason}")]
    PlaybackRejected { reason: String },

    #[error("Audio source dropped the pending playback request")]
    SourceClosed,

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
