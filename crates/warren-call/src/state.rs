// ABOUTME: Call-state adapter normalizing two shapes of an in-flight call.
// ABOUTME: Unified handle or decomposed parts behind one accessor surface.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tonic::metadata::MetadataMap;
use tonic::Status;

use crate::call::RpcCall;

type StatusFn = Box<dyn Fn() -> Status + Send + Sync>;
type TrailersFn = Box<dyn Fn() -> MetadataMap + Send + Sync>;
type DisposeFn = Box<dyn FnOnce() + Send>;
type SharedHeaders = Shared<BoxFuture<'static, MetadataMap>>;

/// Uniform view over an in-flight call, regardless of how it is backed.
///
/// Constructed either from a whole [`RpcCall`] handle or from four
/// decomposed parts (a headers future, status and trailers providers, and a
/// disposal action fired in place of cancel). The backing shape is fixed at
/// construction; every accessor dispatches on it exhaustively.
///
/// Read-only after construction apart from the disposal guard, so it is
/// safe to share across threads.
pub struct CallState {
    inner: Inner,
    disposed: AtomicBool,
}

enum Inner {
    /// Backed by a single call-engine handle.
    Call(Arc<dyn RpcCall>),
    /// Backed by independently supplied parts.
    Parts {
        response_headers: SharedHeaders,
        status: StatusFn,
        trailers: TrailersFn,
        dispose: Mutex<Option<DisposeFn>>,
    },
}

impl CallState {
    /// Adapt a call-engine handle.
    pub fn from_call(call: Arc<dyn RpcCall>) -> Self {
        Self {
            inner: Inner::Call(call),
            disposed: AtomicBool::new(false),
        }
    }

    /// Adapt decomposed parts. `dispose` is invoked in place of cancel,
    /// at most once.
    pub fn from_parts(
        response_headers: impl Future<Output = MetadataMap> + Send + 'static,
        status: impl Fn() -> Status + Send + Sync + 'static,
        trailers: impl Fn() -> MetadataMap + Send + Sync + 'static,
        dispose: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            inner: Inner::Parts {
                response_headers: response_headers.boxed().shared(),
                status: Box::new(status),
                trailers: Box::new(trailers),
                dispose: Mutex::new(Some(Box::new(dispose))),
            },
            disposed: AtomicBool::new(false),
        }
    }

    /// Response headers sent by the server. Resolves exactly once and can
    /// be awaited from multiple clones of the state's view.
    pub async fn response_headers(&self) -> MetadataMap {
        match &self.inner {
            Inner::Call(call) => call.response_headers().await,
            Inner::Parts {
                response_headers, ..
            } => response_headers.clone().await,
        }
    }

    /// Terminal status. Valid only once the call has finished.
    pub fn status(&self) -> Status {
        match &self.inner {
            Inner::Call(call) => call.status(),
            Inner::Parts { status, .. } => status(),
        }
    }

    /// Trailing metadata. Valid only once the call has finished.
    pub fn trailers(&self) -> MetadataMap {
        match &self.inner {
            Inner::Call(call) => call.trailers(),
            Inner::Parts { trailers, .. } => trailers(),
        }
    }

    /// Tear the call down. Cancels the backing handle or fires the stored
    /// disposal action, chosen by backing shape; repeated calls are no-ops.
    /// Runs on drop, so teardown fires exactly once over the lifetime. The
    /// engine treats a cancel after normal completion as a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        match &self.inner {
            Inner::Call(call) => call.cancel(),
            Inner::Parts { dispose, .. } => {
                let action = dispose.lock().ok().and_then(|mut slot| slot.take());
                if let Some(action) = action {
                    action();
                }
            }
        }
        tracing::trace!("call state disposed");
    }
}

impl Drop for CallState {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backing = match &self.inner {
            Inner::Call(_) => "Call",
            Inner::Parts { .. } => "Parts",
        };
        f.debug_struct("CallState")
            .field("backing", &backing)
            .field("disposed", &self.disposed.load(Ordering::Relaxed))
            .finish()
    }
}
