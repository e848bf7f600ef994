// ABOUTME: Call-engine capability traits consumed by the call primitives.
// ABOUTME: The engine issues the network operation; these traits are its narrow surface.

use async_trait::async_trait;
use tonic::metadata::MetadataMap;
use tonic::Status;

/// An abstract RPC call in flight, unary or streaming.
///
/// Implemented by the call engine. All methods are safe to invoke from
/// multiple threads; the engine owns whatever synchronization that takes.
#[async_trait]
pub trait RpcCall: Send + Sync {
    /// Response headers sent by the server before the first message.
    ///
    /// Resolves exactly once. If the call failed before headers arrived this
    /// still resolves with whatever the engine provides; header-phase
    /// failures are reported through the engine's own channels.
    async fn response_headers(&self) -> MetadataMap;

    /// Terminal status of the call. Valid only once the call has finished;
    /// earlier calls return whatever not-yet-available value the engine uses.
    fn status(&self) -> Status;

    /// Trailing metadata of the call. Same precondition as [`status`].
    ///
    /// [`status`]: RpcCall::status
    fn trailers(&self) -> MetadataMap;

    /// Request termination of all pending operations on the call.
    ///
    /// Idempotent. A call that already finished normally treats this as a
    /// no-op; otherwise the call's resources are eventually released.
    fn cancel(&self);
}

/// A call with a server-to-client message stream attached.
#[async_trait]
pub trait StreamingCall<T>: RpcCall {
    /// The next decoded message, or `None` once the stream has ended.
    ///
    /// At most one read may be outstanding per call. Engine failures are
    /// returned verbatim.
    async fn read_message(&self) -> Result<Option<T>, Status>;

    /// Resolves once the call has fully terminated and status/trailers are
    /// available. A non-OK terminal status surfaces as the error.
    async fn completed(&self) -> Result<(), Status>;
}
