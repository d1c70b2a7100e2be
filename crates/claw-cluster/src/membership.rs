//! Cluster membership registry.
//!
//! The registry holds two independent maps from [`NodeAddress`] to
//! [`NodeHandle`]: long-lived cluster members and transient clients. It is
//! read concurrently by request flows and written by membership-change
//! events, so a presence check and a later lookup may disagree.

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::address::NodeAddress;
use crate::error::{ClusterError, Result};

/// Whether a participant is a stable member or an ephemeral client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Long-lived cluster member.
    Member,
    /// Transient client attached to the cluster.
    Client,
}

/// How to reach a registered participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// The participant's canonical address.
    pub address: NodeAddress,
    /// Where the participant's task listener accepts connections.
    pub endpoint: SocketAddr,
    /// Member or client.
    pub role: NodeRole,
    /// When the participant was registered.
    pub joined_at: DateTime<Utc>,
}

impl NodeHandle {
    /// Creates a handle registered now.
    #[must_use]
    pub fn new(address: NodeAddress, endpoint: SocketAddr, role: NodeRole) -> Self {
        Self {
            address,
            endpoint,
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Read access to cluster membership.
///
/// Retrieval code depends on this trait rather than on a concrete registry.
pub trait MembershipView: Send + Sync {
    /// Looks up a participant, checking members before clients.
    fn lookup(&self, addr: &NodeAddress) -> Option<NodeHandle>;

    /// Returns true if the address is a registered member or client.
    fn contains(&self, addr: &NodeAddress) -> bool {
        self.lookup(addr).is_some()
    }
}

/// Registry of cluster members and clients.
#[derive(Debug, Default)]
pub struct ClusterMembership {
    members: RwLock<HashMap<NodeAddress, NodeHandle>>,
    clients: RwLock<HashMap<NodeAddress, NodeHandle>>,
}

impl ClusterMembership {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stable cluster member.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::AlreadyRegistered`] if the address is already
    /// registered as a member or a client.
    pub fn add_member(&self, address: NodeAddress, endpoint: SocketAddr) -> Result<()> {
        self.insert(NodeHandle::new(address, endpoint, NodeRole::Member))
    }

    /// Registers an ephemeral client.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::AlreadyRegistered`] if the address is already
    /// registered as a member or a client.
    pub fn add_client(&self, address: NodeAddress, endpoint: SocketAddr) -> Result<()> {
        self.insert(NodeHandle::new(address, endpoint, NodeRole::Client))
    }

    fn insert(&self, handle: NodeHandle) -> Result<()> {
        // Lock order is always members then clients.
        let mut members = self.members.write();
        let mut clients = self.clients.write();

        if members.contains_key(&handle.address) || clients.contains_key(&handle.address) {
            return Err(ClusterError::AlreadyRegistered(handle.address));
        }

        info!(
            node = %handle.address,
            endpoint = %handle.endpoint,
            role = ?handle.role,
            "Registered cluster participant"
        );

        match handle.role {
            NodeRole::Member => members.insert(handle.address, handle),
            NodeRole::Client => clients.insert(handle.address, handle),
        };
        Ok(())
    }

    /// Removes a participant from whichever map holds it.
    pub fn remove(&self, addr: &NodeAddress) -> Option<NodeHandle> {
        let removed = self
            .members
            .write()
            .remove(addr)
            .or_else(|| self.clients.write().remove(addr));

        if let Some(handle) = &removed {
            info!(node = %handle.address, role = ?handle.role, "Removed cluster participant");
        }
        removed
    }

    /// All stable members, ordered by address.
    #[must_use]
    pub fn members(&self) -> Vec<NodeHandle> {
        sorted(self.members.read().values().cloned().collect())
    }

    /// All ephemeral clients, ordered by address.
    #[must_use]
    pub fn clients(&self) -> Vec<NodeHandle> {
        sorted(self.clients.read().values().cloned().collect())
    }

    /// Total number of registered participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.read().len() + self.clients.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MembershipView for ClusterMembership {
    fn lookup(&self, addr: &NodeAddress) -> Option<NodeHandle> {
        if let Some(handle) = self.members.read().get(addr) {
            return Some(handle.clone());
        }
        self.clients.read().get(addr).cloned()
    }

    fn contains(&self, addr: &NodeAddress) -> bool {
        self.members.read().contains_key(addr) || self.clients.read().contains_key(addr)
    }
}

fn sorted(mut handles: Vec<NodeHandle>) -> Vec<NodeHandle> {
    handles.sort_by_key(|h| h.address);
    handles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    fn addr(port: u16) -> NodeAddress {
        NodeAddress::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    fn endpoint(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    // ==================== Constructor Tests ====================

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ClusterMembership::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.lookup(&addr(1)).is_none());
    }

    // ==================== Registration Tests ====================

    #[test]
    fn test_add_member_and_lookup() {
        let registry = ClusterMembership::new();
        registry.add_member(addr(54322), endpoint(7000)).expect("add member");

        let handle = registry.lookup(&addr(54322)).expect("lookup");
        assert_eq!(handle.role, NodeRole::Member);
        assert_eq!(handle.endpoint, endpoint(7000));
        assert!(registry.contains(&addr(54322)));
    }

    #[test]
    fn test_add_client_and_lookup() {
        let registry = ClusterMembership::new();
        registry.add_client(addr(60001), endpoint(7001)).expect("add client");

        let handle = registry.lookup(&addr(60001)).expect("lookup");
        assert_eq!(handle.role, NodeRole::Client);
        assert_eq!(registry.clients().len(), 1);
        assert!(registry.members().is_empty());
    }

    #[test]
    fn test_duplicate_registration_rejected_across_maps() {
        let registry = ClusterMembership::new();
        registry.add_member(addr(54322), endpoint(7000)).expect("add member");

        let result = registry.add_client(addr(54322), endpoint(7001));
        assert!(matches!(result, Err(ClusterError::AlreadyRegistered(a)) if a == addr(54322)));

        let result = registry.add_member(addr(54322), endpoint(7002));
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_absent_from_both_maps() {
        let registry = ClusterMembership::new();
        registry.add_member(addr(1), endpoint(7000)).expect("add member");
        registry.add_client(addr(2), endpoint(7001)).expect("add client");

        assert!(registry.lookup(&addr(3)).is_none());
        assert!(!registry.contains(&addr(3)));
    }

    // ==================== Removal Tests ====================

    #[test]
    fn test_remove_member_then_client() {
        let registry = ClusterMembership::new();
        registry.add_member(addr(1), endpoint(7000)).expect("add member");
        registry.add_client(addr(2), endpoint(7001)).expect("add client");

        let removed = registry.remove(&addr(1)).expect("remove member");
        assert_eq!(removed.role, NodeRole::Member);
        let removed = registry.remove(&addr(2)).expect("remove client");
        assert_eq!(removed.role, NodeRole::Client);

        assert!(registry.is_empty());
        assert!(registry.remove(&addr(1)).is_none());
    }

    #[test]
    fn test_presence_check_does_not_pin_entry() {
        let registry = ClusterMembership::new();
        registry.add_client(addr(9), endpoint(7009)).expect("add client");

        assert!(registry.contains(&addr(9)));
        registry.remove(&addr(9));
        assert!(registry.lookup(&addr(9)).is_none());
    }

    #[test]
    fn test_members_are_sorted() {
        let registry = ClusterMembership::new();
        registry.add_member(addr(30), endpoint(7030)).expect("add");
        registry.add_member(addr(10), endpoint(7010)).expect("add");
        registry.add_member(addr(20), endpoint(7020)).expect("add");

        let ports: Vec<u16> = registry.members().iter().map(|h| h.address.port()).collect();
        assert_eq!(ports, vec![10, 20, 30]);
    }

    // ==================== Concurrency Tests ====================

    #[test]
    fn test_concurrent_reads_and_writes() {
        let registry = Arc::new(ClusterMembership::new());
        let mut threads = Vec::new();

        for i in 0..8u16 {
            let registry = Arc::clone(&registry);
            threads.push(std::thread::spawn(move || {
                let a = addr(1000 + i);
                registry.add_member(a, endpoint(8000 + i)).expect("add");
                for _ in 0..100 {
                    assert!(registry.lookup(&a).is_some());
                }
                if i % 2 == 0 {
                    registry.remove(&a);
                }
            }));
        }

        for t in threads {
            t.join().expect("thread");
        }
        assert_eq!(registry.len(), 4);
    }
}
