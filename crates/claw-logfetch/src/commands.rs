//! Command table for retrieval requests.
//!
//! Maps a request type identifier such as `logs.fetch` to a typed handler.
//! The table is built once at startup; registration errors surface then, not
//! when a request arrives.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::schema::LogsRequest;
use crate::service::LogRetrievalService;

/// Request type for fetching a node's log.
pub const LOGS_FETCH: &str = "logs.fetch";

/// A request addressed to the command table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Request type identifier.
    pub command: String,
    /// Handler-specific parameters.
    #[serde(default)]
    pub params: Value,
}

impl CommandRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(command: impl Into<String>, params: Value) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }
}

/// Handler signature stored in the table.
pub type CommandFn =
    for<'a> fn(&'a LogRetrievalService, Value) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// Errors raised while building a command table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandTableError {
    /// An identifier is empty.
    #[error("command identifier must not be empty")]
    Empty,

    /// An identifier is registered twice.
    #[error("command {0} registered twice")]
    Duplicate(String),

    /// An identifier is not dot-separated lowercase words.
    #[error("invalid command identifier: {0}")]
    InvalidIdentifier(String),
}

/// Collects handlers before validation.
#[derive(Default)]
pub struct CommandTableBuilder {
    entries: Vec<(String, CommandFn)>,
}

impl CommandTableBuilder {
    /// Adds a handler.
    #[must_use]
    pub fn register(mut self, command: impl Into<String>, handler: CommandFn) -> Self {
        self.entries.push((command.into(), handler));
        self
    }

    /// Validates identifiers and builds the table.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandTableError`] for the first empty, malformed or
    /// duplicate identifier.
    pub fn build(self, service: Arc<LogRetrievalService>) -> std::result::Result<CommandTable, CommandTableError> {
        let mut handlers = BTreeMap::new();
        for (command, handler) in self.entries {
            validate_identifier(&command)?;
            if handlers.contains_key(&command) {
                return Err(CommandTableError::Duplicate(command));
            }
            handlers.insert(command, handler);
        }
        Ok(CommandTable { service, handlers })
    }
}

fn validate_identifier(command: &str) -> std::result::Result<(), CommandTableError> {
    if command.is_empty() {
        return Err(CommandTableError::Empty);
    }
    let well_formed = command.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    });
    if !well_formed {
        return Err(CommandTableError::InvalidIdentifier(command.to_string()));
    }
    Ok(())
}

/// Validated mapping from request type to handler.
pub struct CommandTable {
    service: Arc<LogRetrievalService>,
    handlers: BTreeMap<String, CommandFn>,
}

impl CommandTable {
    /// Starts an empty table.
    #[must_use]
    pub fn builder() -> CommandTableBuilder {
        CommandTableBuilder::default()
    }

    /// Builds the table with every built-in command.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandTableError`] if a built-in registration is invalid.
    pub fn with_defaults(service: Arc<LogRetrievalService>) -> std::result::Result<Self, CommandTableError> {
        Self::builder().register(LOGS_FETCH, handle_logs_fetch).build(service)
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Runs the handler registered for `request.command`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnknownCommand`] if nothing is registered for
    /// the request type, or the handler's error.
    pub async fn handle(&self, request: CommandRequest) -> Result<Value> {
        debug!(command = %request.command, "handling command");

        let handler = self
            .handlers
            .get(&request.command)
            .ok_or_else(|| FetchError::UnknownCommand(request.command.clone()))?;
        handler(self.service.as_ref(), request.params).await
    }
}

fn handle_logs_fetch(
    service: &LogRetrievalService,
    params: Value,
) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
    Box::pin(async move {
        let request: LogsRequest =
            serde_json::from_value(params).map_err(|e| FetchError::InvalidParams(e.to_string()))?;
        let response = service.fetch(&request.ipport, request.name.as_deref()).await?;
        serde_json::to_value(response).map_err(|e| FetchError::InvalidParams(e.to_string()))
    })
}
