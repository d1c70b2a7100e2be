//! # claw-logfetch
//!
//! Cluster-wide log retrieval for Clawbernetes nodes.
//!
//! Any node can ask any registered member or client for one of its log
//! categories. The request runs inline when it targets the local node and
//! travels as a framed [`GetLogTask`] to the target's [`TaskServer`]
//! otherwise, bounded by a deadline and an optional cancellation token.
//!
//! This crate provides:
//!
//! - [`LogRetrievalService`]: Validates a request and returns the log
//! - [`Dispatcher`] / [`Target`]: Local or remote execution of a task
//! - [`TaskServer`] / [`TcpTransport`]: The node-to-node wire path
//! - [`CommandTable`]: Maps request types like `logs.fetch` to handlers
//! - [`NodeConfig`] / [`LogNode`]: Configuration and wiring for a node
//!
//! ## Example
//!
//! ```rust,no_run
//! use claw_logfetch::{LogNode, NodeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NodeConfig::load("/etc/claw-logd/config.json")?;
//! let node = LogNode::from_config(config)?;
//!
//! let response = node.service().fetch("self", Some("info")).await?;
//! println!("{}", response.log);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod schema;
pub mod server;
pub mod service;
pub mod task;
pub mod transport;
pub mod wire;

pub use commands::{CommandFn, CommandRequest, CommandTable, CommandTableError, LOGS_FETCH};
pub use config::{ConfigError, NodeConfig, PeerConfig, DEFAULT_CONFIG_PATH};
pub use dispatch::{Dispatcher, FetchOptions, Target, DEFAULT_RPC_TIMEOUT};
pub use error::{FailureKind, FetchError, Result};
pub use node::{LogNode, NodeError};
pub use schema::{LogsRequest, LogsResponse};
pub use server::{TaskServer, DEFAULT_IDLE_TIMEOUT};
pub use service::LogRetrievalService;
pub use task::{GetLogTask, Priority};
pub use transport::{TaskTransport, TcpTransport};
pub use wire::{TaskOutcome, TaskRequest, TaskResponse, WireError, DEFAULT_MAX_FRAME_SIZE};
