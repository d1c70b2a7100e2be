//! A fully wired log node.

use std::sync::Arc;

use claw_cluster::{ClusterError, ClusterMembership, NodeAddress};
use claw_logs::{platform_descriptor_table, LogCategoryResolver, LogDirectory};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::commands::{CommandTable, CommandTableError};
use crate::config::{ConfigError, NodeConfig};
use crate::dispatch::Dispatcher;
use crate::server::TaskServer;
use crate::service::LogRetrievalService;
use crate::transport::TcpTransport;

/// Errors assembling or running a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Membership could not be seeded.
    #[error("membership error: {0}")]
    Cluster(#[from] ClusterError),

    /// The command table failed validation.
    #[error("command table error: {0}")]
    Commands(#[from] CommandTableError),

    /// The task listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Membership, retrieval service, command table and task server for one node.
pub struct LogNode {
    config: NodeConfig,
    membership: Arc<ClusterMembership>,
    service: Arc<LogRetrievalService>,
    commands: CommandTable,
    server: TaskServer,
}

impl LogNode {
    /// Builds a node that reads logs from the configured directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or lists a peer twice.
    pub fn from_config(config: NodeConfig) -> Result<Self, NodeError> {
        let directory = config
            .log_dir
            .as_ref()
            .map(|dir| LogDirectory::new(dir).with_prefix(config.log_prefix.clone()));
        let resolver = LogCategoryResolver::new(directory)
            .with_descriptor_table(platform_descriptor_table());
        Self::from_parts(config, resolver)
    }

    /// Builds a node around an existing resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or lists a peer twice.
    pub fn from_parts(config: NodeConfig, resolver: LogCategoryResolver) -> Result<Self, NodeError> {
        config.validate()?;
        let local = config.local_address();

        let membership = Arc::new(ClusterMembership::new());
        membership.add_member(local, config.advertise)?;
        for peer in &config.members {
            membership.add_member(NodeAddress::from(peer.address), peer.endpoint)?;
        }
        for peer in &config.clients {
            membership.add_client(NodeAddress::from(peer.address), peer.endpoint)?;
        }

        let resolver = Arc::new(resolver);
        let transport = TcpTransport::new().with_max_frame_size(config.max_frame_size);
        let dispatcher = Dispatcher::new(local, Arc::clone(&resolver), Arc::new(transport))
            .with_rpc_timeout(config.rpc_timeout());
        let service = Arc::new(LogRetrievalService::new(membership.clone(), dispatcher));
        let commands = CommandTable::with_defaults(Arc::clone(&service))?;
        let server = TaskServer::new(local, resolver, config.max_frame_size);

        info!(
            node = %local,
            name = %config.name,
            members = config.members.len(),
            clients = config.clients.len(),
            commands = ?commands.commands(),
            "log node assembled"
        );

        Ok(Self {
            config,
            membership,
            service,
            commands,
            server,
        })
    }

    /// The node's configuration.
    #[must_use]
    pub const fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The node's identity.
    #[must_use]
    pub fn local(&self) -> NodeAddress {
        self.config.local_address()
    }

    /// The membership registry, for membership-change events.
    #[must_use]
    pub const fn membership(&self) -> &Arc<ClusterMembership> {
        &self.membership
    }

    /// The retrieval service.
    #[must_use]
    pub const fn service(&self) -> &Arc<LogRetrievalService> {
        &self.service
    }

    /// The validated command table.
    #[must_use]
    pub const fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// The task server.
    #[must_use]
    pub const fn server(&self) -> &TaskServer {
        &self.server
    }

    /// Binds the configured address and serves tasks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn run(&self) -> Result<(), NodeError> {
        let listener = TcpListener::bind(self.config.bind).await?;
        self.serve(listener).await
    }

    /// Serves tasks on an already-bound listener until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), NodeError> {
        self.server.serve(listener).await?;
        Ok(())
    }

    /// Stops the task server.
    pub fn shutdown(&self) {
        self.server.shutdown();
    }
}
