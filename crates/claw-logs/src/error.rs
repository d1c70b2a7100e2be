//! Error types for log category resolution and reading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving or reading a node's logs.
#[derive(Debug, Error)]
pub enum LogError {
    /// Unknown category name, or a name that could escape the log directory.
    #[error("invalid log category '{name}': {reason}")]
    InvalidCategory {
        /// The name that was requested.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No log directory is configured on this node.
    #[error("logging not configured")]
    LoggingNotConfigured,

    /// The resolved log file does not exist.
    #[error("file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The resolved log file exists but cannot be read.
    #[error("file {} is not readable", .0.display())]
    FileNotReadable(PathBuf),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Creates an [`LogError::InvalidCategory`] error.
    pub fn invalid_category(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCategory {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
