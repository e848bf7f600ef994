// ABOUTME: Client-side call primitives shared by warren gRPC clients.
// ABOUTME: Capability traits, the call-state adapter, and typed call wrappers.

pub mod call;
pub mod calls;
pub mod error;
pub mod io;
pub mod state;

// Call-engine capability
pub use call::{RpcCall, StreamingCall};

// Error types
pub use error::CallError;

// Reader/writer capability
pub use io::{StreamNext, StreamReader, StreamWriter};

// Call-state adapter
pub use state::CallState;

// Typed call wrappers
pub use calls::{ClientStreamingCall, DuplexStreamingCall, ServerStreamingCall, UnaryCall};
