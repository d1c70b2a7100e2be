//! Task listener that executes tasks shipped from other nodes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use claw_cluster::NodeAddress;
use claw_logs::LogCategoryResolver;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::FailureKind;
use crate::task::GetLogTask;
use crate::wire::{self, frame_codec, TaskOutcome, TaskRequest, TaskResponse, WireError};

/// How long a connection may sit without sending a request before it is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Accepts task connections and runs each task against this node's logs.
#[derive(Debug, Clone)]
pub struct TaskServer {
    local: NodeAddress,
    resolver: Arc<LogCategoryResolver>,
    max_frame_size: usize,
    idle_timeout: Duration,
    shutdown: CancellationToken,
}

impl TaskServer {
    /// Creates a server for the node identified by `local`.
    #[must_use]
    pub fn new(local: NodeAddress, resolver: Arc<LogCategoryResolver>, max_frame_size: usize) -> Self {
        Self {
            local,
            resolver,
            max_frame_size,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            shutdown: CancellationToken::new(),
        }
    }

    /// Sets how long an idle connection is kept open.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds a listener and serves until [`TaskServer::shutdown`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind_and_serve(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves connections from an already-bound listener until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        info!(addr = %addr, node = %self.local, "Task server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            let server = self.clone();
                            tokio::spawn(async move {
                                server.handle_connection(stream, peer_addr).await;
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                () = self.shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(node = %self.local, "Task server shutting down");
        Ok(())
    }

    /// Stops the accept loop. Connections already in flight finish.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn handle_connection(&self, stream: TcpStream, peer_addr: SocketAddr) {
        debug!(peer = %peer_addr, "New task connection");
        let mut framed = Framed::new(stream, frame_codec(self.max_frame_size));

        loop {
            let frame = match tokio::time::timeout(self.idle_timeout, framed.next()).await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(_) => {
                    debug!(peer = %peer_addr, timeout = ?self.idle_timeout, "Closing idle task connection");
                    return;
                }
            };
            let response = match frame.map_err(WireError::from).and_then(|f| wire::decode::<TaskRequest>(&f)) {
                Ok(request) => self.execute(request).await,
                Err(e) => {
                    warn!(peer = %peer_addr, error = %e, "Dropping connection after bad frame");
                    return;
                }
            };

            let payload = match self.encode_response(&response) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(peer = %peer_addr, error = %e, "Failed to encode task response");
                    return;
                }
            };
            if let Err(e) = framed.send(payload).await {
                warn!(peer = %peer_addr, error = %e, "Failed to send task response");
                return;
            }
        }

        debug!(peer = %peer_addr, "Task connection closed");
    }

    /// Encodes a response, replacing it with an execution failure when it
    /// cannot be encoded or would not fit in one frame.
    fn encode_response(&self, response: &TaskResponse) -> Result<Bytes, WireError> {
        let id = response.id;
        let message = match wire::encode(response) {
            Ok(payload) if payload.len() <= self.max_frame_size => return Ok(payload),
            Ok(payload) => format!(
                "log exceeds max frame size of {} bytes ({} bytes encoded)",
                self.max_frame_size,
                payload.len()
            ),
            Err(e) => format!("failed to encode task response: {e}"),
        };

        warn!(id = %id, node = %self.local, error = %message, "Replacing task response with failure");
        wire::encode(&TaskResponse {
            id,
            outcome: TaskOutcome::Failed {
                kind: FailureKind::Execution,
                message,
            },
        })
    }

    async fn execute(&self, request: TaskRequest) -> TaskResponse {
        let TaskRequest { id, task } = request;
        debug!(id = %id, category = %task.category_name(), priority = ?task.priority, "GetLogTask received");

        let resolver = Arc::clone(&self.resolver);
        let joined = tokio::task::spawn_blocking(move || {
            let mut task: GetLogTask = task;
            let result = task.execute(&resolver);
            (task, result)
        })
        .await;

        let outcome = match joined {
            Ok((task, Ok(()))) => TaskOutcome::Completed { task },
            Ok((_, Err(e))) => TaskOutcome::Failed {
                kind: FailureKind::of(&e),
                message: e.to_string(),
            },
            Err(e) => TaskOutcome::Failed {
                kind: FailureKind::Execution,
                message: format!("task panicked or was cancelled: {e}"),
            },
        };

        debug!(id = %id, node = %self.local, completed = matches!(outcome, TaskOutcome::Completed { .. }), "GetLogTask finished");
        TaskResponse { id, outcome }
    }
}
