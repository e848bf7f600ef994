// ABOUTME: Cursor over a server-to-client response stream.
// ABOUTME: Pulls one message at a time and binds caller cancellation to the call.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use warren_call::{
    CallError, CallState, DuplexStreamingCall, ServerStreamingCall, StreamNext, StreamReader,
    StreamWriter, StreamingCall,
};

/// Where the cursor stands in the life of the stream.
enum ReadState<T> {
    /// Nothing fetched yet, or the last held message was consumed by an
    /// end-of-stream read that has not settled cleanly.
    Idle,
    /// The last advance produced this message.
    Current(T),
    /// The stream ended and the call's terminal status is resolvable.
    Finished,
    /// Cancellation or disposal preempted the stream.
    Cancelled,
}

/// Cursor over the response messages of a streaming call.
///
/// Shares the call with whoever owns it and pulls messages strictly one at a
/// time; `&mut self` on [`advance`] keeps a single pull in flight. Once the
/// cursor reports [`StreamNext::Finished`] or [`StreamNext::Cancelled`] it
/// stays there and never touches the call engine again.
///
/// [`advance`]: ResponseStream::advance
pub struct ResponseStream<T> {
    call: Arc<dyn StreamingCall<T>>,
    state: ReadState<T>,
}

impl<T> ResponseStream<T> {
    /// Create a cursor over `call`'s response stream.
    pub fn new(call: Arc<dyn StreamingCall<T>>) -> Self {
        Self {
            call,
            state: ReadState::Idle,
        }
    }

    /// Pull the next message, racing the read against `signal`.
    ///
    /// While the read is in flight, firing `signal` requests cancellation of
    /// the owning call and parks the cursor in the cancelled state; the link
    /// between signal and call lives exactly as long as the read. At end of
    /// stream the call's completion is awaited first, so status and trailers
    /// are resolvable by the time [`StreamNext::Finished`] is returned; a
    /// non-OK terminal status propagates verbatim instead.
    pub async fn advance(&mut self, signal: &CancellationToken) -> Result<StreamNext, CallError> {
        match self.state {
            ReadState::Finished => return Ok(StreamNext::Finished),
            ReadState::Cancelled => return Ok(StreamNext::Cancelled),
            ReadState::Idle | ReadState::Current(_) => {}
        }

        // The select scope is the cancellation link: armed before the read
        // starts waiting, released on every exit path once it settles.
        // Biased so an already-fired signal wins over a ready message.
        let read = tokio::select! {
            biased;
            _ = signal.cancelled() => {
                self.call.cancel();
                self.state = ReadState::Cancelled;
                tracing::debug!("response stream cancelled by caller");
                return Ok(StreamNext::Cancelled);
            }
            read = self.call.read_message() => read,
        };

        match read? {
            Some(message) => {
                self.state = ReadState::Current(message);
                Ok(StreamNext::Message)
            }
            None => {
                // The held message is gone either way; status and trailers
                // must be resolvable before the caller learns the stream is
                // done, so a failed call keeps surfacing its status here.
                self.state = ReadState::Idle;
                self.call.completed().await?;
                self.state = ReadState::Finished;
                tracing::trace!("response stream finished");
                Ok(StreamNext::Finished)
            }
        }
    }

    /// The message produced by the last successful advance.
    pub fn current(&self) -> Result<&T, CallError> {
        match &self.state {
            ReadState::Current(message) => Ok(message),
            ReadState::Idle | ReadState::Finished | ReadState::Cancelled => {
                Err(CallError::NoMessage)
            }
        }
    }

    /// Stop the stream. A cursor that has not seen end of stream cancels the
    /// underlying call; a finished one is left alone. Runs on drop.
    pub fn dispose(&mut self) {
        match self.state {
            ReadState::Finished | ReadState::Cancelled => {}
            ReadState::Idle | ReadState::Current(_) => {
                self.call.cancel();
                self.state = ReadState::Cancelled;
                tracing::debug!("response stream dropped before exhaustion, call cancelled");
            }
        }
    }
}

#[async_trait]
impl<T: Send + 'static> StreamReader<T> for ResponseStream<T> {
    async fn advance(&mut self, signal: &CancellationToken) -> Result<StreamNext, CallError> {
        ResponseStream::advance(self, signal).await
    }

    fn current(&self) -> Result<&T, CallError> {
        ResponseStream::current(self)
    }

    fn dispose(&mut self) {
        ResponseStream::dispose(self)
    }
}

impl<T> Drop for ResponseStream<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Assemble a server-streaming call wrapper from a call-engine handle.
pub fn server_streaming_call<T, C>(call: Arc<C>) -> ServerStreamingCall<T>
where
    T: Send + 'static,
    C: StreamingCall<T> + 'static,
{
    let responses = ResponseStream::new(call.clone() as Arc<dyn StreamingCall<T>>);
    ServerStreamingCall::new(responses, CallState::from_call(call))
}

/// Assemble a duplex call wrapper from a call-engine handle and the writer
/// feeding the request stream.
pub fn duplex_streaming_call<TReq, TResp, C, W>(
    call: Arc<C>,
    requests: W,
) -> DuplexStreamingCall<TReq, TResp>
where
    TReq: 'static,
    TResp: Send + 'static,
    C: StreamingCall<TResp> + 'static,
    W: StreamWriter<TReq> + 'static,
{
    let responses = ResponseStream::new(call.clone() as Arc<dyn StreamingCall<TResp>>);
    DuplexStreamingCall::new(requests, responses, CallState::from_call(call))
}
