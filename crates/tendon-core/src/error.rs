//! Error types for Tendon

use thiserror::Error;

/// The main error type for Tendon operations
#[derive(Debug, Error)]
pub enum TendonError {
    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Invalid keyframe track: {0}")]
    InvalidTrack(String),

    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    #[error("Skeleton '{skeleton}' needs {required} bone slots, capacity is {capacity}")]
    CapacityExceeded {
        skeleton: String,
        required: usize,
        capacity: usize,
    },

    #[error("Unknown clip: {0}")]
    UnknownClip(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Animation error: {0}")]
    AnimationError(String),
}

/// Result type alias for Tendon operations
pub type Result<T> = std::result::Result<T, TendonError>;

impl From<toml::de::Error> for TendonError {
    fn from(err: toml::de::Error) -> Self {
        TendonError::TomlParseError(err.to_string())
    }
}
