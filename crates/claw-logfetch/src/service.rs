//! Log retrieval orchestration.

use std::sync::Arc;

use claw_cluster::{AddressParser, MembershipView};
use claw_logs::LogCategory;
use tracing::debug;

use crate::dispatch::{Dispatcher, FetchOptions, Target};
use crate::error::{FailureKind, FetchError, Result};
use crate::schema::LogsResponse;
use crate::task::GetLogTask;

/// Fetches log content from any node in the cluster.
///
/// Inputs are validated in a fixed order before anything is dispatched:
/// address, then membership, then category name.
pub struct LogRetrievalService {
    parser: AddressParser,
    membership: Arc<dyn MembershipView>,
    dispatcher: Dispatcher,
}

impl LogRetrievalService {
    /// Creates a service over a membership view and a dispatcher.
    #[must_use]
    pub fn new(membership: Arc<dyn MembershipView>, dispatcher: Dispatcher) -> Self {
        Self {
            parser: AddressParser::new(dispatcher.local()),
            membership,
            dispatcher,
        }
    }

    /// The address parser bound to this node's identity.
    #[must_use]
    pub const fn parser(&self) -> &AddressParser {
        &self.parser
    }

    /// Fetches a log with the default deadline and no cancellation.
    ///
    /// # Errors
    ///
    /// See [`LogRetrievalService::fetch_with`].
    pub async fn fetch(&self, node: &str, name: Option<&str>) -> Result<LogsResponse> {
        self.fetch_with(node, name, &FetchOptions::default()).await
    }

    /// Fetches the `name` log (default `debug`) from `node`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidAddress`] if `node` cannot be parsed
    /// - [`FetchError::NodeNotFound`] if the node is not registered
    /// - [`FetchError::InvalidCategory`] if `name` contains a path separator
    ///   or is not a known category; nothing is dispatched
    /// - [`FetchError::NodeUnavailable`] or [`FetchError::Cancelled`] if the
    ///   remote wait does not complete
    /// - file and execution errors raised by the task body
    pub async fn fetch_with(
        &self,
        node: &str,
        name: Option<&str>,
        options: &FetchOptions,
    ) -> Result<LogsResponse> {
        let addr = self.parser.parse(node)?;

        if !self.membership.contains(&addr) {
            return Err(FetchError::NodeNotFound(node.to_string()));
        }

        // The category set is the same on every node, so unknown names are
        // rejected here rather than after a round trip.
        if let Some(name) = name {
            name.parse::<LogCategory>()
                .map_err(|e| FetchError::InvalidCategory(e.to_string()))?;
        }

        let mut task = GetLogTask::new(name.map(str::to_string));
        let target = Target::resolve(self.dispatcher.local(), addr, self.membership.as_ref())?;

        debug!(node = %addr, category = %task.category_name(), "GetLogTask starting to node");
        self.dispatcher.dispatch(&target, &mut task, options).await?;

        let GetLogTask { name, log, success, .. } = task;
        let (true, Some(log)) = (success, log) else {
            return Err(FetchError::TaskExecution {
                node: addr,
                kind: FailureKind::Execution,
                message: "task did not complete successfully".to_string(),
            });
        };
        let name = name.unwrap_or_else(|| "debug".to_string());

        debug!(node = %addr, category = %name, bytes = log.len(), "GetLogTask completed to node");
        Ok(LogsResponse {
            ipport: node.to_string(),
            name,
            log,
        })
    }
}
