//! Sending tasks to remote nodes.

use std::future::Future;
use std::pin::Pin;

use claw_cluster::NodeHandle;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::trace;

use crate::wire::{self, frame_codec, TaskRequest, TaskResponse, WireError, DEFAULT_MAX_FRAME_SIZE};

/// Delivers a task to a node and returns its single response.
///
/// Implementations do not impose a deadline; the dispatcher bounds the
/// returned future and drops it on expiry or cancellation.
pub trait TaskTransport: Send + Sync {
    /// Sends `request` to `handle` and waits for the response.
    fn call<'a>(
        &'a self,
        handle: &'a NodeHandle,
        request: TaskRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TaskResponse, WireError>> + Send + 'a>>;
}

/// Transport that opens one TCP connection per call.
#[derive(Debug, Clone, Copy)]
pub struct TcpTransport {
    max_frame_size: usize,
}

impl TcpTransport {
    /// Creates a transport with the default frame size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    async fn round_trip(
        &self,
        handle: &NodeHandle,
        request: TaskRequest,
    ) -> Result<TaskResponse, WireError> {
        let stream = TcpStream::connect(handle.endpoint).await?;
        stream.set_nodelay(true)?;
        let mut framed = Framed::new(stream, frame_codec(self.max_frame_size));

        trace!(node = %handle.address, id = %request.id, "sending task");
        framed.send(wire::encode(&request)?).await?;

        let frame = framed.next().await.ok_or(WireError::ConnectionClosed)??;
        let response: TaskResponse = wire::decode(&frame)?;
        trace!(node = %handle.address, id = %response.id, "received task response");
        Ok(response)
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskTransport for TcpTransport {
    fn call<'a>(
        &'a self,
        handle: &'a NodeHandle,
        request: TaskRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TaskResponse, WireError>> + Send + 'a>> {
        Box::pin(self.round_trip(handle, request))
    }
}
