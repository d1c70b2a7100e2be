//! Error types for log retrieval.

use std::path::PathBuf;

use claw_cluster::{ClusterError, NodeAddress};
use claw_logs::LogError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of failure raised while executing a task body.
///
/// Carried over the wire so a remote failure keeps its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The category was rejected by the resolver.
    InvalidCategory,
    /// The resolved file does not exist.
    FileNotFound,
    /// The resolved file cannot be read.
    FileNotReadable,
    /// No log directory is configured.
    LoggingNotConfigured,
    /// Anything else.
    Execution,
}

impl FailureKind {
    /// Classifies a task body error.
    #[must_use]
    pub const fn of(err: &LogError) -> Self {
        match err {
            LogError::InvalidCategory { .. } => Self::InvalidCategory,
            LogError::FileNotFound(_) => Self::FileNotFound,
            LogError::FileNotReadable(_) => Self::FileNotReadable,
            LogError::LoggingNotConfigured => Self::LoggingNotConfigured,
            LogError::Io(_) => Self::Execution,
        }
    }
}

/// Errors surfaced by a log fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Address text is malformed or the host could not be resolved.
    #[error("{0}")]
    InvalidAddress(String),

    /// The address does not match any registered member or client.
    #[error("no node running as part of this cluster on {0}")]
    NodeNotFound(String),

    /// The node was registered but could not be reached.
    #[error("node {node} is unavailable: {reason}")]
    NodeUnavailable {
        /// The node that could not be reached.
        node: NodeAddress,
        /// What went wrong.
        reason: String,
    },

    /// Unknown category name or a name containing a path separator.
    #[error("{0}")]
    InvalidCategory(String),

    /// The resolved log file does not exist.
    #[error("file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The resolved log file cannot be read.
    #[error("file {} is not readable", .0.display())]
    FileNotReadable(PathBuf),

    /// No log directory is configured on the node.
    #[error("logging not configured")]
    LoggingNotConfigured,

    /// The task failed while executing.
    #[error("task execution failed on {node}: {message}")]
    TaskExecution {
        /// The node that executed the task.
        node: NodeAddress,
        /// The underlying failure kind.
        kind: FailureKind,
        /// The underlying failure message.
        message: String,
    },

    /// The caller cancelled the fetch while it was waiting for the node.
    #[error("fetch from {0} cancelled")]
    Cancelled(NodeAddress),

    /// The command table has no handler for this request type.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Request parameters could not be decoded.
    #[error("invalid params: {0}")]
    InvalidParams(String),
}

impl FetchError {
    /// Converts a task body error raised on `node`.
    #[must_use]
    pub fn from_log_error(err: LogError, node: NodeAddress) -> Self {
        match err {
            LogError::InvalidCategory { .. } => Self::InvalidCategory(err.to_string()),
            LogError::FileNotFound(path) => Self::FileNotFound(path),
            LogError::FileNotReadable(path) => Self::FileNotReadable(path),
            LogError::LoggingNotConfigured => Self::LoggingNotConfigured,
            LogError::Io(_) => Self::TaskExecution {
                node,
                kind: FailureKind::Execution,
                message: err.to_string(),
            },
        }
    }

    /// Status code a request/response boundary should report.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAddress(_) | Self::InvalidCategory(_) | Self::InvalidParams(_) => 400,
            Self::NodeNotFound(_) | Self::FileNotFound(_) | Self::UnknownCommand(_) => 404,
            Self::NodeUnavailable { .. } | Self::Cancelled(_) => 503,
            Self::FileNotReadable(_) | Self::LoggingNotConfigured | Self::TaskExecution { .. } => {
                500
            }
        }
    }
}

impl From<ClusterError> for FetchError {
    fn from(err: ClusterError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use test_case::test_case;

    fn node() -> NodeAddress {
        NodeAddress::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 54322)
    }

    #[test]
    fn error_display_messages() {
        let err = FetchError::NodeNotFound("10.0.0.9:54321".to_string());
        assert_eq!(
            err.to_string(),
            "no node running as part of this cluster on 10.0.0.9:54321"
        );

        let err = FetchError::NodeUnavailable {
            node: node(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "node 127.0.0.1:54322 is unavailable: connection refused");

        let err = FetchError::Cancelled(node());
        assert_eq!(err.to_string(), "fetch from 127.0.0.1:54322 cancelled");
    }

    #[test]
    fn cluster_error_becomes_invalid_address() {
        let err: FetchError = ClusterError::invalid_address("nope", "missing port").into();
        assert!(matches!(err, FetchError::InvalidAddress(ref m) if m.contains("nope")));
    }

    #[test]
    fn log_errors_keep_their_kind() {
        let err = FetchError::from_log_error(LogError::FileNotFound("/x".into()), node());
        assert!(matches!(err, FetchError::FileNotFound(_)));

        let err = FetchError::from_log_error(LogError::LoggingNotConfigured, node());
        assert!(matches!(err, FetchError::LoggingNotConfigured));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = FetchError::from_log_error(LogError::Io(io), node());
        assert!(matches!(
            err,
            FetchError::TaskExecution { kind: FailureKind::Execution, .. }
        ));
    }

    #[test]
    fn failure_kind_classification() {
        assert_eq!(
            FailureKind::of(&LogError::invalid_category("x", "y")),
            FailureKind::InvalidCategory
        );
        assert_eq!(
            FailureKind::of(&LogError::FileNotReadable("/x".into())),
            FailureKind::FileNotReadable
        );
    }

    #[test_case(FetchError::InvalidAddress("x".into()), 400)]
    #[test_case(FetchError::InvalidCategory("x".into()), 400)]
    #[test_case(FetchError::NodeNotFound("x".into()), 404)]
    #[test_case(FetchError::FileNotFound("/x".into()), 404)]
    #[test_case(FetchError::UnknownCommand("x".into()), 404)]
    #[test_case(FetchError::Cancelled(node()), 503)]
    #[test_case(FetchError::LoggingNotConfigured, 500)]
    fn status_codes(err: FetchError, expected: u16) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
    }
}
