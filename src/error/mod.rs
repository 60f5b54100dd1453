//! Error handling module for ytclip

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for clip operations
#[derive(Error, Debug)]
pub enum ClipError {
    /// A required request field is absent or blank
    #[error("Missing required parameters")]
    MissingParameters,

    /// Timecode text is not `HH:MM:SS` made of non-negative integers
    #[error("Invalid time format: {time}. Expected HH:MM:SS")]
    InvalidFormat { time: String },

    /// End of the clip is not after its start
    #[error("end must be > start")]
    InvalidRange { start: u64, end: u64 },

    /// Requested clip is longer than the configured maximum
    #[error("Clip duration of {duration}s exceeds the maximum of {max}s")]
    DurationExceeded { duration: u64, max: u64 },

    /// Quality is not one of the supported vertical resolutions
    #[error("Unsupported quality: {quality}. Expected 720p, 480p or 360p")]
    UnsupportedQuality { quality: String },

    /// Retrieval tool could not be spawned or exited unsuccessfully
    #[error("Retrieval failed: {message}")]
    RetrievalFailed { message: String },

    /// Filesystem error while waiting for an artifact
    #[error("Failed to watch {}: {source}", path.display())]
    WatchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact never became stable
    #[error("Timeout waiting for file: {}", path.display())]
    WatchTimeout { path: PathBuf, timeout_ms: u64 },

    /// Transcode tool could not be spawned or exited unsuccessfully
    #[error("Transcode failed: {message}")]
    TranscodeFailed { message: String },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipError {
    /// Whether the error was caused by the caller's input rather than a downstream failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ClipError::MissingParameters
                | ClipError::InvalidFormat { .. }
                | ClipError::InvalidRange { .. }
                | ClipError::DurationExceeded { .. }
                | ClipError::UnsupportedQuality { .. }
        )
    }

    /// Short stable name of the error kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ClipError::MissingParameters => "MissingParameters",
            ClipError::InvalidFormat { .. } => "InvalidFormat",
            ClipError::InvalidRange { .. } => "InvalidRange",
            ClipError::DurationExceeded { .. } => "DurationExceeded",
            ClipError::UnsupportedQuality { .. } => "UnsupportedQuality",
            ClipError::RetrievalFailed { .. } => "RetrievalFailed",
            ClipError::WatchFailed { .. } => "WatchFailed",
            ClipError::WatchTimeout { .. } => "WatchTimeout",
            ClipError::TranscodeFailed { .. } => "TranscodeFailed",
            ClipError::Config { .. } => "Config",
            ClipError::Io(_) => "Io",
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ClipError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for clip operations
pub type ClipResult<T> = std::result::Result<T, ClipError>;
