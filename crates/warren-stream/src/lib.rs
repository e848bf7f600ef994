// ABOUTME: Streaming primitives for warren gRPC clients.
// ABOUTME: Response-stream cursor, request sink, and generic traversal helpers.

pub mod sink;
pub mod stream;
pub mod util;

// Response stream cursor and call assembly
pub use stream::{duplex_streaming_call, server_streaming_call, ResponseStream};

// Request sink
pub use sink::{RequestSink, DEFAULT_REQUEST_BUFFER};

// Stream traversal helpers
pub use util::{collect, for_each, write_all};
