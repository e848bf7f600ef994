// ABOUTME: Reader/writer capability contracts for streaming calls.
// ABOUTME: The stream algorithms and typed call wrappers are written against these.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::CallError;

/// Outcome of advancing a response stream by one step.
///
/// Cancellation is a normal outcome, not an error: a caller iterating a
/// stream sees messages followed by `Finished`, an early `Cancelled`, or a
/// propagated failure. There is no fourth case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamNext {
    /// A message was produced and is readable via `current`.
    Message,
    /// The stream ended; status and trailers are now resolvable.
    Finished,
    /// Cancellation preempted the read.
    Cancelled,
}

/// Pull side of a server-to-client message stream.
///
/// A reader must never be advanced concurrently from two call sites;
/// `&mut self` on [`advance`] enforces at most one in-flight pull.
///
/// [`advance`]: StreamReader::advance
#[async_trait]
pub trait StreamReader<T>: Send {
    /// Pull the next message, racing the read against `signal`.
    ///
    /// Firing `signal` while the read is in flight requests cancellation of
    /// the owning call; firing it after the read has settled has no effect
    /// on the returned outcome.
    async fn advance(&mut self, signal: &CancellationToken) -> Result<StreamNext, CallError>;

    /// The message produced by the last successful advance.
    ///
    /// Fails with [`CallError::NoMessage`] before the first advance and
    /// after the stream has finished or been cancelled.
    fn current(&self) -> Result<&T, CallError>;

    /// Stop servicing advances and release the underlying call.
    /// Idempotent and non-blocking.
    fn dispose(&mut self);
}

/// Push side of a client-to-server message stream.
#[async_trait]
pub trait StreamWriter<T>: Send {
    /// Write one item; resolves once the item has been accepted. Writes are
    /// never issued concurrently by the helpers in this workspace.
    async fn write(&mut self, item: T) -> Result<(), CallError>;

    /// Signal that no further writes will occur.
    async fn complete(&mut self) -> Result<(), CallError>;
}
