//! Wire protocol between nodes.
//!
//! Each message is one length-delimited frame (4-byte big-endian length
//! prefix) holding a JSON document. A caller sends a [`TaskRequest`] and
//! waits for exactly one [`TaskResponse`] with the same id.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::codec::LengthDelimitedCodec;
use uuid::Uuid;

use crate::error::FailureKind;
use crate::task::GetLogTask;

/// Default maximum frame size: 16MB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Errors on the node-to-node connection.
#[derive(Debug, Error)]
pub enum WireError {
    /// Connecting, reading or writing failed.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection before answering.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A frame could not be encoded or decoded.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl WireError {
    /// Returns true if the peer could not be reached or went away.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::ConnectionClosed)
    }
}

/// A task shipped to a remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Correlation id echoed in the response.
    pub id: Uuid,
    /// The task to execute.
    pub task: GetLogTask,
}

impl TaskRequest {
    /// Wraps a task with a fresh id.
    #[must_use]
    pub fn new(task: GetLogTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
        }
    }
}

/// Result of a remote execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The task ran; this is its final state.
    Completed {
        /// The executed task.
        task: GetLogTask,
    },
    /// The task body failed.
    Failed {
        /// Failure classification.
        kind: FailureKind,
        /// Failure message.
        message: String,
    },
}

/// Answer to a [`TaskRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// The request's correlation id.
    pub id: Uuid,
    /// What happened.
    pub outcome: TaskOutcome,
}

/// Builds the frame codec with a size limit.
#[must_use]
pub fn frame_codec(max_frame_size: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_size)
        .new_codec()
}

/// Encodes a message as a frame payload.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] if serialization fails.
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes, WireError> {
    Ok(Bytes::from(serde_json::to_vec(message)?))
}

/// Decodes a frame payload.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] if the payload is not a valid message.
pub fn decode<T: for<'de> Deserialize<'de>>(payload: &[u8]) -> Result<T, WireError> {
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use bytes::BytesMut;
    use proptest::prelude::*;
    use tokio_util::codec::{Decoder, Encoder};

    #[test]
    fn request_ids_are_unique() {
        let a = TaskRequest::new(GetLogTask::new(None));
        let b = TaskRequest::new(GetLogTask::new(None));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn outcome_is_tagged() {
        let response = TaskResponse {
            id: Uuid::nil(),
            outcome: TaskOutcome::Failed {
                kind: FailureKind::FileNotFound,
                message: "file /x does not exist".to_string(),
            },
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["kind"], "file_not_found");
    }

    #[test]
    fn frames_survive_the_codec() {
        let mut task = GetLogTask::new(Some("info".to_string()));
        task.log = Some("line\n".to_string());
        task.success = true;
        let request = TaskRequest::new(task);

        let mut codec = frame_codec(DEFAULT_MAX_FRAME_SIZE);
        let mut buf = BytesMut::new();
        codec
            .encode(encode(&request).expect("encode"), &mut buf)
            .expect("frame");

        let frame = codec.decode(&mut buf).expect("decode").expect("complete frame");
        let back: TaskRequest = decode(&frame).expect("decode payload");
        assert_eq!(back, request);
    }

    #[test]
    fn oversized_frames_are_rejected() {
        let mut codec = frame_codec(16);
        let mut buf = BytesMut::new();
        let payload = encode(&TaskRequest::new(GetLogTask::new(None))).expect("encode");
        assert!(codec.encode(payload, &mut buf).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        let result: Result<TaskResponse, _> = decode(b"not json");
        assert!(matches!(result, Err(WireError::Malformed(_))));
        assert!(!WireError::Malformed(serde_json::Error::io(std::io::Error::other("x")))
            .is_connection_failure());
        assert!(WireError::ConnectionClosed.is_connection_failure());
    }

    fn arb_task() -> impl Strategy<Value = GetLogTask> {
        (
            prop_oneof![Just(Priority::Bulk), Just(Priority::Normal), Just(Priority::Gui)],
            proptest::option::of(".{0,16}"),
            proptest::option::of(any::<String>()),
            any::<bool>(),
        )
            .prop_map(|(priority, name, log, success)| GetLogTask {
                priority,
                name,
                log,
                success,
            })
    }

    fn arb_outcome() -> impl Strategy<Value = TaskOutcome> {
        let kind = prop_oneof![
            Just(FailureKind::InvalidCategory),
            Just(FailureKind::FileNotFound),
            Just(FailureKind::FileNotReadable),
            Just(FailureKind::LoggingNotConfigured),
            Just(FailureKind::Execution),
        ];
        prop_oneof![
            arb_task().prop_map(|task| TaskOutcome::Completed { task }),
            (kind, any::<String>()).prop_map(|(kind, message)| TaskOutcome::Failed { kind, message }),
        ]
    }

    /// Pushes a message through encode, the frame codec, and decode.
    fn through_codec<T>(message: &T) -> T
    where
        T: Serialize + for<'de> Deserialize<'de>,
    {
        let mut codec = frame_codec(DEFAULT_MAX_FRAME_SIZE);
        let mut buf = BytesMut::new();
        codec
            .encode(encode(message).expect("encode"), &mut buf)
            .expect("frame");
        let frame = codec.decode(&mut buf).expect("decode").expect("complete frame");
        assert!(buf.is_empty());
        decode(&frame).expect("decode payload")
    }

    proptest! {
        #[test]
        fn prop_requests_survive_framing(task in arb_task(), raw_id in any::<u128>()) {
            let request = TaskRequest { id: Uuid::from_u128(raw_id), task };
            prop_assert_eq!(through_codec(&request), request);
        }

        #[test]
        fn prop_responses_survive_framing(outcome in arb_outcome(), raw_id in any::<u128>()) {
            let response = TaskResponse { id: Uuid::from_u128(raw_id), outcome };
            prop_assert_eq!(through_codec(&response), response);
        }
    }
}
