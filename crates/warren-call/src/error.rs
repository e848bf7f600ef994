// ABOUTME: Error types for the warren-call crate.
// ABOUTME: Usage errors for the reader/writer contracts plus verbatim RPC failures.

use thiserror::Error;
use tonic::Status;

/// Errors surfaced by the call and stream primitives.
///
/// Cancellation is never reported here; it travels through
/// [`StreamNext::Cancelled`](crate::io::StreamNext) as a normal outcome.
#[derive(Error, Debug)]
pub enum CallError {
    /// The reader holds no message: `current` was read before the first
    /// successful advance, or after the stream terminated.
    #[error("no message is currently available")]
    NoMessage,

    /// The request sink was completed, or the receiving side is gone.
    #[error("request sink closed")]
    SinkClosed,

    /// Failure reported by the underlying call, propagated verbatim.
    #[error(transparent)]
    Rpc(#[from] Status),
}

impl CallError {
    /// The gRPC status carried by an [`CallError::Rpc`] failure, if any.
    pub fn rpc_status(&self) -> Option<&Status> {
        match self {
            CallError::Rpc(status) => Some(status),
            _ => None,
        }
    }
}
