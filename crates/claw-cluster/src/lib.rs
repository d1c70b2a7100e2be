//! # claw-cluster
//!
//! Node addressing and cluster membership for Clawbernetes.
//!
//! This crate provides:
//!
//! - [`NodeAddress`]: Canonical node identity (resolved IP + public port)
//! - [`AddressParser`]: Parses `self` / `host:port` into a [`NodeAddress`]
//! - [`ClusterMembership`]: Registry of stable members and ephemeral clients
//! - [`MembershipView`]: Read-only lookup interface used by request flows
//!
//! ## Example
//!
//! ```rust
//! use claw_cluster::{AddressParser, ClusterMembership, MembershipView, NodeAddress};
//!
//! let local: NodeAddress = "127.0.0.1:54322".parse::<std::net::SocketAddr>()?.into();
//! let parser = AddressParser::new(local);
//!
//! let membership = ClusterMembership::new();
//! membership.add_member(local, local.socket_addr())?;
//!
//! // Internal port 54321 maps to public port 54322.
//! let addr = parser.parse("127.0.0.1:54321")?;
//! assert_eq!(addr, local);
//! assert!(membership.contains(&addr));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod membership;

pub use address::{AddressParser, NodeAddress, PUBLIC_PORT_OFFSET, SELF_ADDRESS};
pub use error::{ClusterError, Result};
pub use membership::{ClusterMembership, MembershipView, NodeHandle, NodeRole};
