// ABOUTME: Generic traversal and production helpers for streaming calls.
// ABOUTME: Free functions over the reader/writer contracts, strictly sequential.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use warren_call::{CallError, StreamNext, StreamReader, StreamWriter};

/// Read the stream to completion, running `action` for each message.
///
/// Each action is awaited before the next advance, so at most one action is
/// in flight and messages are handed over in arrival order. A reader that
/// reports cancellation ends traversal without error; failures from the
/// reader or the action propagate immediately and abandon iteration.
pub async fn for_each<T, R, F, Fut>(reader: &mut R, mut action: F) -> Result<(), CallError>
where
    T: Clone,
    R: StreamReader<T> + ?Sized,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), CallError>>,
{
    let signal = CancellationToken::new();
    while let StreamNext::Message = reader.advance(&signal).await? {
        action(reader.current()?.clone()).await?;
    }
    Ok(())
}

/// Read the stream to completion and return every message in arrival order.
pub async fn collect<T, R>(reader: &mut R) -> Result<Vec<T>, CallError>
where
    T: Clone,
    R: StreamReader<T> + ?Sized,
{
    let mut messages = Vec::new();
    let signal = CancellationToken::new();
    while let StreamNext::Message = reader.advance(&signal).await? {
        messages.push(reader.current()?.clone());
    }
    Ok(messages)
}

/// Write every item to the stream, in sequence, one settled write at a time.
///
/// Completes the stream afterwards unless `complete` is false; an empty
/// `items` with `complete = true` still signals completion. Failures
/// propagate immediately, leaving the remaining items unwritten.
pub async fn write_all<T, W, I>(writer: &mut W, items: I, complete: bool) -> Result<(), CallError>
where
    W: StreamWriter<T> + ?Sized,
    I: IntoIterator<Item = T>,
{
    for item in items {
        writer.write(item).await?;
    }
    if complete {
        writer.complete().await?;
    }
    Ok(())
}
