//! Error types for the logging facility

use std::io;
use std::path::PathBuf;

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while logging
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create the log directory
    #[error("failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Write submitted during or after sink close; the entry was redirected
    /// to the diagnostic fallback stream
    #[error("log sink closed")]
    SinkClosed,

    /// Payload could not be serialized
    #[error("failed to encode log entry: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Named-file logger requested before the configuration was loaded
    #[error("logging configuration not loaded")]
    ConfigNotSet,

    /// Drain task panicked before reporting its flush result
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
