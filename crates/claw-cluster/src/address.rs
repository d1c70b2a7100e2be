//! Node addressing.
//!
//! A [`NodeAddress`] is the canonical identity of a cluster participant: the
//! resolved IP plus its public port. Callers refer to nodes either by the
//! literal `self` or by `host:port`, where `port` is the node's internal port.
//! The public port is always `port + 1`, so [`AddressParser::parse`] applies
//! that offset before building the key.

use std::fmt;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ClusterError, Result};

/// Literal that designates the local node.
pub const SELF_ADDRESS: &str = "self";

/// Offset between a node's internal port and its public port.
pub const PUBLIC_PORT_OFFSET: u16 = 1;

/// Canonical identity of a cluster participant.
///
/// Two addresses are equal iff both the IP and the port match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddress {
    ip: IpAddr,
    port: u16,
}

impl NodeAddress {
    /// Creates an address from an already-canonical IP and public port.
    #[must_use]
    pub const fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// The resolved IP.
    #[must_use]
    pub const fn ip(&self) -> IpAddr {
        self.ip
    }

    /// The public port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The address as a socket address.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl From<SocketAddr> for NodeAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

/// Turns caller-supplied node identifiers into canonical [`NodeAddress`] keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressParser {
    local: NodeAddress,
}

impl AddressParser {
    /// Creates a parser that maps `self` to `local`.
    #[must_use]
    pub const fn new(local: NodeAddress) -> Self {
        Self { local }
    }

    /// The local node's identity.
    #[must_use]
    pub const fn local(&self) -> NodeAddress {
        self.local
    }

    /// Parses `self` or `host:port` into a canonical address.
    ///
    /// The split happens on the last `:`, so bracketed IPv6 hosts such as
    /// `[::1]:54321` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidAddress`] if the text has no port, the
    /// port is not a number, the public port would overflow, or the host
    /// cannot be resolved.
    pub fn parse(&self, text: &str) -> Result<NodeAddress> {
        if text == SELF_ADDRESS {
            return Ok(self.local);
        }

        let (host, port) = text
            .rsplit_once(':')
            .ok_or_else(|| ClusterError::invalid_address(text, "expected 'host:port' or 'self'"))?;

        let internal: u16 = port
            .parse()
            .map_err(|_| ClusterError::invalid_address(text, format!("invalid port '{port}'")))?;
        let public = internal
            .checked_add(PUBLIC_PORT_OFFSET)
            .ok_or_else(|| ClusterError::invalid_address(text, "public port out of range"))?;

        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(ClusterError::invalid_address(text, "empty host"));
        }

        let ip = resolve_host(host)
            .ok_or_else(|| ClusterError::invalid_address(text, format!("cannot resolve host '{host}'")))?;

        trace!(input = %text, ip = %ip, port = public, "parsed node address");
        Ok(NodeAddress::new(ip, public))
    }
}

fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }
    (host, 0)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| addr.ip())
}
