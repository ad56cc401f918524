//! A minimal, executor-agnostic yield point used by `Ring::async_prepare`
//! and `Ring::async_read` to retry a failed lease attempt without busy-spinning
//! the calling thread inside a single `poll`.
//!
//! This deliberately does not depend on any async runtime: the core crate
//! stays usable under tokio, async-std, embassy, or a hand-rolled executor
//! alike. A real deployment under a multi-threaded runtime will usually pair
//! `async_prepare`/`async_read` with that runtime's own notification
//! mechanism instead of this unconditional yield-and-spin; this type covers
//! the common case where the lease is expected to become available soon
//! (e.g. a cooperating thread is about to release one).

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that is `Pending` the first time it is polled, and `Ready`
/// every time after that.
///
/// On the first poll it re-arms its own waker immediately, so the executor
/// reschedules it rather than parking it indefinitely — this is a
/// cooperative yield, not a wait for an external event.
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Yields control back to the executor once, then resumes.
pub(crate) fn yield_once() -> impl Future<Output = ()> {
    YieldOnce { yielded: false }
}
