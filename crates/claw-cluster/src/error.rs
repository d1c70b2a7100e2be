//! Error types for node addressing and membership.

use thiserror::Error;

use crate::address::NodeAddress;

/// Errors that can occur while parsing addresses or mutating membership.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Address text is malformed or the host could not be resolved.
    #[error("invalid node address '{input}': {reason}")]
    InvalidAddress {
        /// The text that was supplied.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A node with this address is already registered.
    #[error("node {0} is already registered")]
    AlreadyRegistered(NodeAddress),
}

impl ClusterError {
    /// Creates an [`ClusterError::InvalidAddress`] error.
    pub fn invalid_address(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for cluster operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn error_display_messages() {
        let err = ClusterError::invalid_address("nohost", "missing port");
        assert_eq!(err.to_string(), "invalid node address 'nohost': missing port");

        let addr = NodeAddress::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 54322);
        let err = ClusterError::AlreadyRegistered(addr);
        assert_eq!(err.to_string(), "node 127.0.0.1:54322 is already registered");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClusterError>();
    }
}
