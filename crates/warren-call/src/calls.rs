// ABOUTME: Typed wrappers for the four client call shapes.
// ABOUTME: Each pairs a CallState with the response future and/or stream halves.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tonic::metadata::MetadataMap;
use tonic::Status;

use crate::io::{StreamReader, StreamWriter};
use crate::state::CallState;

/// A single-request, single-response call in flight.
pub struct UnaryCall<T> {
    response: BoxFuture<'static, Result<T, Status>>,
    state: CallState,
}

impl<T> UnaryCall<T> {
    /// Wrap a pending response and its call state.
    pub fn new(
        response: impl Future<Output = Result<T, Status>> + Send + 'static,
        state: CallState,
    ) -> Self {
        Self {
            response: response.boxed(),
            state,
        }
    }

    /// Await the single response message, consuming the call.
    /// The call state is released once the response has settled.
    pub async fn response(self) -> Result<T, Status> {
        self.response.await
    }

    /// Response headers sent by the server.
    pub async fn response_headers(&self) -> MetadataMap {
        self.state.response_headers().await
    }

    /// Terminal status. Valid only once the call has finished.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Trailing metadata. Valid only once the call has finished.
    pub fn trailers(&self) -> MetadataMap {
        self.state.trailers()
    }

    /// Tear the call down early. Also runs when the wrapper is dropped.
    pub fn dispose(&self) {
        self.state.dispose()
    }
}

/// A call with a single request and a stream of responses.
pub struct ServerStreamingCall<T> {
    responses: Box<dyn StreamReader<T>>,
    state: CallState,
}

impl<T> ServerStreamingCall<T> {
    /// Wrap a response reader and its call state.
    pub fn new(responses: impl StreamReader<T> + 'static, state: CallState) -> Self {
        Self {
            responses: Box::new(responses),
            state,
        }
    }

    /// The stream of response messages.
    pub fn responses(&mut self) -> &mut dyn StreamReader<T> {
        self.responses.as_mut()
    }

    /// Response headers sent by the server.
    pub async fn response_headers(&self) -> MetadataMap {
        self.state.response_headers().await
    }

    /// Terminal status. Valid only once the call has finished.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Trailing metadata. Valid only once the call has finished.
    pub fn trailers(&self) -> MetadataMap {
        self.state.trailers()
    }

    /// Tear the call down early. Also runs when the wrapper is dropped.
    pub fn dispose(&self) {
        self.state.dispose()
    }
}

/// A call with a stream of requests and a single response.
pub struct ClientStreamingCall<TReq, TResp> {
    requests: Box<dyn StreamWriter<TReq>>,
    response: BoxFuture<'static, Result<TResp, Status>>,
    state: CallState,
}

impl<TReq, TResp> ClientStreamingCall<TReq, TResp> {
    /// Wrap a request writer, the pending response, and the call state.
    pub fn new(
        requests: impl StreamWriter<TReq> + 'static,
        response: impl Future<Output = Result<TResp, Status>> + Send + 'static,
        state: CallState,
    ) -> Self {
        Self {
            requests: Box::new(requests),
            response: response.boxed(),
            state,
        }
    }

    /// The stream of request messages.
    pub fn requests(&mut self) -> &mut dyn StreamWriter<TReq> {
        self.requests.as_mut()
    }

    /// Await the single response message, consuming the call. Complete the
    /// request stream first; most servers respond only after it closes.
    pub async fn response(self) -> Result<TResp, Status> {
        self.response.await
    }

    /// Response headers sent by the server.
    pub async fn response_headers(&self) -> MetadataMap {
        self.state.response_headers().await
    }

    /// Terminal status. Valid only once the call has finished.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Trailing metadata. Valid only once the call has finished.
    pub fn trailers(&self) -> MetadataMap {
        self.state.trailers()
    }

    /// Tear the call down early. Also runs when the wrapper is dropped.
    pub fn dispose(&self) {
        self.state.dispose()
    }
}

/// A call with request and response streams open at the same time.
pub struct DuplexStreamingCall<TReq, TResp> {
    requests: Box<dyn StreamWriter<TReq>>,
    responses: Box<dyn StreamReader<TResp>>,
    state: CallState,
}

impl<TReq, TResp> DuplexStreamingCall<TReq, TResp> {
    /// Wrap both stream halves and the call state.
    pub fn new(
        requests: impl StreamWriter<TReq> + 'static,
        responses: impl StreamReader<TResp> + 'static,
        state: CallState,
    ) -> Self {
        Self {
            requests: Box::new(requests),
            responses: Box::new(responses),
            state,
        }
    }

    /// The stream of request messages.
    pub fn requests(&mut self) -> &mut dyn StreamWriter<TReq> {
        self.requests.as_mut()
    }

    /// The stream of response messages.
    pub fn responses(&mut self) -> &mut dyn StreamReader<TResp> {
        self.responses.as_mut()
    }

    /// Both stream halves at once, for interleaved reading and writing.
    pub fn io(&mut self) -> (&mut dyn StreamWriter<TReq>, &mut dyn StreamReader<TResp>) {
        (self.requests.as_mut(), self.responses.as_mut())
    }

    /// Response headers sent by the server.
    pub async fn response_headers(&self) -> MetadataMap {
        self.state.response_headers().await
    }

    /// Terminal status. Valid only once the call has finished.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Trailing metadata. Valid only once the call has finished.
    pub fn trailers(&self) -> MetadataMap {
        self.state.trailers()
    }

    /// Tear the call down early. Also runs when the wrapper is dropped.
    pub fn dispose(&self) {
        self.state.dispose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::io::StreamNext;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tonic::Code;

    /// Reader yielding a fixed script of messages, then finishing.
    struct ScriptedReader {
        pending: VecDeque<String>,
        current: Option<String>,
    }

    impl ScriptedReader {
        fn new(items: &[&str]) -> Self {
            Self {
                pending: items.iter().map(|s| s.to_string()).collect(),
                current: None,
            }
        }
    }

    #[async_trait]
    impl StreamReader<String> for ScriptedReader {
        async fn advance(&mut self, _signal: &CancellationToken) -> Result<StreamNext, CallError> {
            match self.pending.pop_front() {
                Some(item) => {
                    self.current = Some(item);
                    Ok(StreamNext::Message)
                }
                None => {
                    self.current = None;
                    Ok(StreamNext::Finished)
                }
            }
        }

        fn current(&self) -> Result<&String, CallError> {
            self.current.as_ref().ok_or(CallError::NoMessage)
        }

        fn dispose(&mut self) {
            self.pending.clear();
            self.current = None;
        }
    }

    /// Writer recording everything pushed into it.
    struct RecordingWriter {
        written: Vec<String>,
        completions: usize,
    }

    impl RecordingWriter {
        fn new() -> Self {
            Self {
                written: Vec::new(),
                completions: 0,
            }
        }
    }

    #[async_trait]
    impl StreamWriter<String> for RecordingWriter {
        async fn write(&mut self, item: String) -> Result<(), CallError> {
            self.written.push(item);
            Ok(())
        }

        async fn complete(&mut self) -> Result<(), CallError> {
            self.completions += 1;
            Ok(())
        }
    }

    fn tracked_state(dispositions: Arc<AtomicUsize>) -> CallState {
        CallState::from_parts(
            async { MetadataMap::new() },
            || Status::new(Code::Ok, "settled"),
            MetadataMap::new,
            move || {
                dispositions.fetch_add(1, Ordering::SeqCst);
            },
        )
    }

    #[tokio::test]
    async fn test_unary_call_response() {
        let dispositions = Arc::new(AtomicUsize::new(0));
        let call = UnaryCall::new(
            async { Ok("pong".to_string()) },
            tracked_state(dispositions.clone()),
        );

        assert_eq!(call.status().message(), "settled");
        let response = call.response().await.unwrap();
        assert_eq!(response, "pong");
        assert_eq!(dispositions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unary_call_failed_response() {
        let call: UnaryCall<String> = UnaryCall::new(
            async { Err(Status::deadline_exceeded("too slow")) },
            tracked_state(Arc::new(AtomicUsize::new(0))),
        );

        let err = call.response().await.unwrap_err();
        assert_eq!(err.code(), Code::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_server_streaming_call_reads_in_order() {
        let mut call = ServerStreamingCall::new(
            ScriptedReader::new(&["a", "b"]),
            tracked_state(Arc::new(AtomicUsize::new(0))),
        );

        let signal = CancellationToken::new();
        let responses = call.responses();
        assert_eq!(responses.advance(&signal).await.unwrap(), StreamNext::Message);
        assert_eq!(responses.current().unwrap(), "a");
        assert_eq!(responses.advance(&signal).await.unwrap(), StreamNext::Message);
        assert_eq!(responses.current().unwrap(), "b");
        assert_eq!(
            responses.advance(&signal).await.unwrap(),
            StreamNext::Finished
        );
        assert!(matches!(
            responses.current(),
            Err(CallError::NoMessage)
        ));
    }

    #[tokio::test]
    async fn test_dropping_wrapper_disposes_state_once() {
        let dispositions = Arc::new(AtomicUsize::new(0));
        {
            let call = ServerStreamingCall::new(
                ScriptedReader::new(&[]),
                tracked_state(dispositions.clone()),
            );
            call.dispose();
            call.dispose();
        }
        assert_eq!(dispositions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_streaming_call_writes_then_responds() {
        let mut call = ClientStreamingCall::new(
            RecordingWriter::new(),
            async { Ok("summary".to_string()) },
            tracked_state(Arc::new(AtomicUsize::new(0))),
        );

        call.requests().write("one".to_string()).await.unwrap();
        call.requests().write("two".to_string()).await.unwrap();
        call.requests().complete().await.unwrap();

        let response = call.response().await.unwrap();
        assert_eq!(response, "summary");
    }

    #[tokio::test]
    async fn test_duplex_call_interleaves_halves() {
        let mut call = DuplexStreamingCall::new(
            RecordingWriter::new(),
            ScriptedReader::new(&["reply"]),
            tracked_state(Arc::new(AtomicUsize::new(0))),
        );

        let signal = CancellationToken::new();
        let (requests, responses) = call.io();
        requests.write("ask".to_string()).await.unwrap();
        assert_eq!(responses.advance(&signal).await.unwrap(), StreamNext::Message);
        assert_eq!(responses.current().unwrap(), "reply");
    }

    #[tokio::test]
    async fn test_wrapper_headers_delegate_to_state() {
        let state = CallState::from_parts(
            async {
                let mut headers = MetadataMap::new();
                headers.insert("x-route", "edge-2".parse().unwrap());
                headers
            },
            || Status::new(Code::Ok, ""),
            MetadataMap::new,
            || {},
        );
        let call = ServerStreamingCall::new(ScriptedReader::new(&[]), state);

        let headers = call.response_headers().await;
        assert_eq!(headers.get("x-route").unwrap(), "edge-2");
    }
}
