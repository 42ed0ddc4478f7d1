//! Error types for DataMirror

use thiserror::Error;

/// Result type alias for DataMirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Main error type for DataMirror
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Corrupt checkpoint at {key}: {reason}")]
    CheckpointCorrupt { key: String, reason: String },

    #[error("Job {0} is already running")]
    JobAlreadyRunning(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MirrorError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        MirrorError::Validation(msg.into())
    }

    /// Create an adapter error
    pub fn adapter(msg: impl Into<String>) -> Self {
        MirrorError::Adapter(msg.into())
    }

    /// Create a consistency error
    pub fn consistency(msg: impl Into<String>) -> Self {
        MirrorError::Consistency(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        MirrorError::Config(msg.into())
    }
}
