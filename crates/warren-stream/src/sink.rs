// ABOUTME: Writer half of a client request stream, backed by a bounded channel.
// ABOUTME: The receiving half is handed to the generated client method.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use warren_call::{CallError, StreamWriter};

/// Default buffer size for outbound request channels.
pub const DEFAULT_REQUEST_BUFFER: usize = 100;

/// Push side of a client-to-server request stream.
///
/// Writes park when the buffer is full, so a slow transport applies
/// backpressure to the producer. Completing the sink closes the outbound
/// stream; further writes fail with [`CallError::SinkClosed`].
pub struct RequestSink<T> {
    tx: Option<mpsc::Sender<T>>,
}

impl<T> RequestSink<T> {
    /// Create a sink and the outbound stream to pass to the client method.
    pub fn channel(buffer: usize) -> (Self, ReceiverStream<T>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx: Some(tx) }, ReceiverStream::new(rx))
    }

    /// Create a sink pair with the default buffer size.
    pub fn with_default_buffer() -> (Self, ReceiverStream<T>) {
        Self::channel(DEFAULT_REQUEST_BUFFER)
    }

    /// Whether the sink was completed or the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().map_or(true, |tx| tx.is_closed())
    }

    /// Remaining buffer capacity; zero once the sink is completed.
    pub fn capacity(&self) -> usize {
        self.tx.as_ref().map_or(0, |tx| tx.capacity())
    }
}

#[async_trait]
impl<T: Send> StreamWriter<T> for RequestSink<T> {
    async fn write(&mut self, item: T) -> Result<(), CallError> {
        match &self.tx {
            Some(tx) => tx.send(item).await.map_err(|_| CallError::SinkClosed),
            None => Err(CallError::SinkClosed),
        }
    }

    async fn complete(&mut self) -> Result<(), CallError> {
        match self.tx.take() {
            Some(_) => {
                tracing::trace!("request sink completed");
                Ok(())
            }
            None => Err(CallError::SinkClosed),
        }
    }
}
