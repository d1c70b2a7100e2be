//! Local or remote execution of a task.

use std::sync::Arc;
use std::time::Duration;

use claw_cluster::{MembershipView, NodeAddress, NodeHandle};
use claw_logs::LogCategoryResolver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{FailureKind, FetchError, Result};
use crate::task::GetLogTask;
use crate::transport::TaskTransport;
use crate::wire::{TaskOutcome, TaskRequest};

/// Default deadline for a remote call.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a task runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// This node; the task runs inline.
    Local,
    /// Another node, reached through its handle.
    Remote(NodeHandle),
}

impl Target {
    /// Resolves the target for `addr` once per fetch.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NodeUnavailable`] if `addr` is not local and has
    /// left the membership since it was last checked.
    pub fn resolve(local: NodeAddress, addr: NodeAddress, membership: &dyn MembershipView) -> Result<Self> {
        if addr == local {
            return Ok(Self::Local);
        }
        membership
            .lookup(&addr)
            .map(Self::Remote)
            .ok_or_else(|| FetchError::NodeUnavailable {
                node: addr,
                reason: "node left the cluster before dispatch".to_string(),
            })
    }
}

/// Per-call limits for a fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Overrides the dispatcher's remote deadline.
    pub deadline: Option<Duration>,
    /// Aborts the wait for a remote node when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl FetchOptions {
    /// Creates options with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the remote deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Runs tasks on their target node.
pub struct Dispatcher {
    local: NodeAddress,
    resolver: Arc<LogCategoryResolver>,
    transport: Arc<dyn TaskTransport>,
    rpc_timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher for the node identified by `local`.
    #[must_use]
    pub fn new(
        local: NodeAddress,
        resolver: Arc<LogCategoryResolver>,
        transport: Arc<dyn TaskTransport>,
    ) -> Self {
        Self {
            local,
            resolver,
            transport,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }

    /// Sets the default remote deadline.
    #[must_use]
    pub const fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// The local node's identity.
    #[must_use]
    pub const fn local(&self) -> NodeAddress {
        self.local
    }

    /// Executes `task` on `target`, updating it in place.
    ///
    /// The local path never suspends. The remote path waits for exactly one
    /// response, bounded by the deadline and the cancellation token.
    ///
    /// # Errors
    ///
    /// Local task errors are returned with their own kind. Remote task
    /// errors are wrapped in [`FetchError::TaskExecution`]. An unreachable or
    /// silent node yields [`FetchError::NodeUnavailable`], and a cancelled
    /// wait yields [`FetchError::Cancelled`].
    pub async fn dispatch(&self, target: &Target, task: &mut GetLogTask, options: &FetchOptions) -> Result<()> {
        match target {
            Target::Local => task
                .execute(&self.resolver)
                .map_err(|e| FetchError::from_log_error(e, self.local)),
            Target::Remote(handle) => self.dispatch_remote(handle, task, options).await,
        }
    }

    async fn dispatch_remote(&self, handle: &NodeHandle, task: &mut GetLogTask, options: &FetchOptions) -> Result<()> {
        let node = handle.address;
        let deadline = options.deadline.unwrap_or(self.rpc_timeout);
        let cancel = options.cancel.clone().unwrap_or_default();

        let request = TaskRequest::new(task.clone());
        let id = request.id;
        debug!(node = %node, id = %id, "GetLogTask starting to node");

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FetchError::Cancelled(node)),
            result = tokio::time::timeout(deadline, self.transport.call(handle, request)) => match result {
                Err(_) => {
                    return Err(FetchError::NodeUnavailable {
                        node,
                        reason: format!("no response within {deadline:?}"),
                    });
                }
                Ok(Err(e)) if e.is_connection_failure() => {
                    return Err(FetchError::NodeUnavailable { node, reason: e.to_string() });
                }
                Ok(Err(e)) => {
                    return Err(FetchError::TaskExecution {
                        node,
                        kind: FailureKind::Execution,
                        message: e.to_string(),
                    });
                }
                Ok(Ok(response)) => response,
            },
        };

        if response.id != id {
            return Err(FetchError::TaskExecution {
                node,
                kind: FailureKind::Execution,
                message: format!("response {} does not match request {id}", response.id),
            });
        }

        match response.outcome {
            TaskOutcome::Completed { task: done } => {
                trace!(node = %node, success = done.success, "GetLogTask completed to node");
                *task = done;
                Ok(())
            }
            TaskOutcome::Failed { kind, message } => Err(FetchError::TaskExecution { node, kind, message }),
        }
    }
}
