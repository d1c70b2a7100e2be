//! Node configuration.
//!
//! Loaded from a JSON file and covering:
//! - the node's name, listener and canonical cluster address
//! - where log files live and how they are named
//! - limits for remote calls
//! - the initial member and client lists

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use claw_cluster::NodeAddress;
use claw_logs::DEFAULT_FILE_PREFIX;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::DEFAULT_RPC_TIMEOUT;
use crate::wire::DEFAULT_MAX_FRAME_SIZE;

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/claw-logd/config.json";

/// Default task listener port.
pub const DEFAULT_PORT: u16 = 54322;

/// Smallest accepted frame size limit.
pub const MIN_FRAME_SIZE: usize = 4 * 1024;

/// Largest accepted frame size limit.
pub const MAX_FRAME_SIZE: usize = 256 * 1024 * 1024;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file '{}': {source}", path.display())]
    Io {
        /// The config path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for a config.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range or inconsistent.
    #[error("configuration error: {0}")]
    Invalid(String),
}

/// A registered peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Canonical cluster address (public port).
    pub address: SocketAddr,
    /// Where the peer's task listener accepts connections.
    pub endpoint: SocketAddr,
}

impl PeerConfig {
    /// Creates a peer entry.
    #[must_use]
    pub const fn new(address: SocketAddr, endpoint: SocketAddr) -> Self {
        Self { address, endpoint }
    }
}

/// Configuration for a log node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Human-readable node name.
    pub name: String,
    /// Task listener bind address.
    pub bind: SocketAddr,
    /// This node's canonical cluster address.
    pub advertise: SocketAddr,
    /// Log directory; `None` means logging is not configured.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Log file name prefix.
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Remote call deadline in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    /// Maximum frame size on node-to-node connections.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
    /// Stable cluster members.
    #[serde(default)]
    pub members: Vec<PeerConfig>,
    /// Ephemeral clients.
    #[serde(default)]
    pub clients: Vec<PeerConfig>,
}

fn default_log_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

const fn default_rpc_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT.as_secs()
}

const fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

impl NodeConfig {
    /// Creates a config listening and advertising on `addr`.
    #[must_use]
    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            bind: addr,
            advertise: addr,
            log_dir: None,
            log_prefix: default_log_prefix(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            max_frame_size: default_max_frame_size(),
            members: Vec::new(),
            clients: Vec::new(),
        }
    }

    /// A config suitable as a starting point for a single node.
    #[must_use]
    pub fn sample() -> Self {
        let bind = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT);
        let advertise = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT);
        Self::new("node-1", bind)
            .with_advertise(advertise)
            .with_log_dir("/var/log/claw")
    }

    /// Sets the canonical cluster address.
    #[must_use]
    pub const fn with_advertise(mut self, advertise: SocketAddr) -> Self {
        self.advertise = advertise;
        self
    }

    /// Sets the log directory.
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Sets the log file prefix.
    #[must_use]
    pub fn with_log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = prefix.into();
        self
    }

    /// Sets the remote call deadline.
    #[must_use]
    pub const fn with_rpc_timeout_secs(mut self, secs: u64) -> Self {
        self.rpc_timeout_secs = secs;
        self
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Adds a stable member.
    #[must_use]
    pub fn with_member(mut self, peer: PeerConfig) -> Self {
        self.members.push(peer);
        self
    }

    /// Adds an ephemeral client.
    #[must_use]
    pub fn with_client(mut self, peer: PeerConfig) -> Self {
        self.clients.push(peer);
        self
    }

    /// This node's identity.
    #[must_use]
    pub fn local_address(&self) -> NodeAddress {
        NodeAddress::from(self.advertise)
    }

    /// The remote call deadline.
    #[must_use]
    pub const fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    /// Loads and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a value is rejected.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first rejected value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("node name cannot be empty".to_string()));
        }

        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid(
                "node name must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            ));
        }

        if self.advertise.ip().is_unspecified() {
            return Err(ConfigError::Invalid(
                "advertise address must be a concrete IP".to_string(),
            ));
        }

        if self.log_prefix.is_empty() || self.log_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "log_prefix must be a non-empty file name fragment".to_string(),
            ));
        }

        if self.rpc_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "rpc_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&self.max_frame_size) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_size must be between {MIN_FRAME_SIZE} and {MAX_FRAME_SIZE}"
            )));
        }

        let mut seen = vec![self.advertise];
        for peer in self.members.iter().chain(&self.clients) {
            if seen.contains(&peer.address) {
                return Err(ConfigError::Invalid(format!(
                    "address {} is listed more than once",
                    peer.address
                )));
            }
            seen.push(peer.address);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn addr(s: &str) -> SocketAddr {
        s.parse().expect("socket addr")
    }

    #[test]
    fn parse_minimal_config() {
        let json = r#"{
            "name": "node-a",
            "bind": "0.0.0.0:54322",
            "advertise": "10.0.0.1:54322"
        }"#;

        let config = NodeConfig::from_json(json).expect("should parse minimal config");
        assert_eq!(config.name, "node-a");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_prefix, "claw");
        assert_eq!(config.rpc_timeout(), DEFAULT_RPC_TIMEOUT);
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert!(config.members.is_empty());
        assert_eq!(config.local_address(), NodeAddress::from(addr("10.0.0.1:54322")));
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "name": "node-a",
            "bind": "0.0.0.0:54322",
            "advertise": "10.0.0.1:54322",
            "log_dir": "/var/log/claw",
            "log_prefix": "node",
            "rpc_timeout_secs": 5,
            "max_frame_size": 65536,
            "members": [{"address": "10.0.0.2:54322", "endpoint": "10.0.0.2:54322"}],
            "clients": [{"address": "10.0.0.9:54322", "endpoint": "10.0.0.9:54400"}]
        }"#;

        let config = NodeConfig::from_json(json).expect("should parse full config");
        assert_eq!(config.log_dir.as_deref(), Some(Path::new("/var/log/claw")));
        assert_eq!(config.log_prefix, "node");
        assert_eq!(config.rpc_timeout(), Duration::from_secs(5));
        assert_eq!(config.members.len(), 1);
        assert_eq!(config.clients[0].endpoint, addr("10.0.0.9:54400"));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(NodeConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test_case(NodeConfig::new("", addr("127.0.0.1:1")) ; "empty name")]
    #[test_case(NodeConfig::new("bad name", addr("127.0.0.1:1")) ; "name with space")]
    #[test_case(NodeConfig::new("n", addr("0.0.0.0:1")) ; "unspecified advertise")]
    #[test_case(NodeConfig::new("n", addr("127.0.0.1:1")).with_log_prefix("a/b") ; "prefix with separator")]
    #[test_case(NodeConfig::new("n", addr("127.0.0.1:1")).with_rpc_timeout_secs(0) ; "zero timeout")]
    #[test_case(NodeConfig::new("n", addr("127.0.0.1:1")).with_max_frame_size(16) ; "tiny frames")]
    #[test_case(
        NodeConfig::new("n", addr("127.0.0.1:1"))
            .with_member(PeerConfig::new(addr("127.0.0.1:1"), addr("127.0.0.1:1")))
        ; "self listed as member"
    )]
    #[test_case(
        NodeConfig::new("n", addr("127.0.0.1:1"))
            .with_member(PeerConfig::new(addr("127.0.0.1:2"), addr("127.0.0.1:2")))
            .with_client(PeerConfig::new(addr("127.0.0.1:2"), addr("127.0.0.1:3")))
        ; "member and client share address"
    )]
    fn rejects_invalid_config(config: NodeConfig) {
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn sample_is_valid() {
        NodeConfig::sample().validate().expect("sample config should validate");
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("config.json");
        let config = NodeConfig::sample()
            .with_member(PeerConfig::new(addr("10.0.0.2:54322"), addr("10.0.0.2:54322")));

        config.save(&path).expect("save");
        let loaded = NodeConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().expect("temp dir");
        let result = NodeConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
