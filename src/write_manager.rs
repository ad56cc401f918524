//! The write-side lease manager: hands out [`WriteLease`](crate::lease::WriteLease)s
//! over unused capacity and publishes them oldest-release-first.

use crate::error::OutOfRange;
use crate::ring::dist;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Owns the write-side node list and its mutex.
///
/// The manager does not own the cursors it reads and writes — `stop` and
/// `after_stop` live on the `Ring` as plain atomics, and `before_start` is
/// owned by the read manager. This mirrors the source design, where each
/// manager holds references to the cursor(s) it mutates and a read-only
/// reference to its peer's cursor, without the two managers ever needing the
/// same lock.
pub(crate) struct WriteManager {
    /// Outstanding write-node cursor values, oldest first.
    nodes: Mutex<VecDeque<usize>>,
}

impl WriteManager {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Mutex::new(VecDeque::new()),
        }
    }

    /// Lends `n` elements of capacity, or fails with `OutOfRange` if fewer
    /// than `n` are available. Returns the half-open `[w_start, w_stop)`
    /// range to give the new lease.
    pub(crate) fn lend(
        &self,
        capacity: usize,
        n: usize,
        after_stop: &AtomicUsize,
        before_start: &AtomicUsize,
    ) -> Result<(usize, usize), OutOfRange> {
        let mut nodes = self.nodes.lock().unwrap();

        let after = after_stop.load(Ordering::Relaxed);
        let before = before_start.load(Ordering::Acquire);
        // R=1: reserve the anti-aliasing slot so a full write still leaves
        // start != stop detectable. Computed as dist(after + 1, before)
        // rather than dist(after, before) - 1, since the latter underflows
        // when after == before (the all-free case, e.g. a fresh ring).
        let available = dist(capacity, (after + 1) % capacity, before);

        if n > available {
            return Err(OutOfRange::Lease {
                requested: n,
                available,
            });
        }

        let w_start = after;
        let w_stop = (w_start + n) % capacity;
        nodes.push_back(w_start);
        after_stop.store(w_stop, Ordering::Release);

        tracing::trace!(w_start, w_stop, requested = n, "write lease acquired");

        Ok((w_start, w_stop))
    }

    /// Lends everything currently available (possibly zero elements).
    pub(crate) fn lend_all(
        &self,
        capacity: usize,
        after_stop: &AtomicUsize,
        before_start: &AtomicUsize,
    ) -> (usize, usize) {
        let mut nodes = self.nodes.lock().unwrap();

        let after = after_stop.load(Ordering::Relaxed);
        let before = before_start.load(Ordering::Acquire);
        let available = dist(capacity, (after + 1) % capacity, before);

        let w_start = after;
        let w_stop = (w_start + available) % capacity;
        nodes.push_back(w_start);
        after_stop.store(w_stop, Ordering::Release);

        tracing::trace!(w_start, w_stop, "write lease acquired (lend_all)");

        (w_start, w_stop)
    }

    /// Releases the lease whose node was `w_start`. If it was the oldest
    /// outstanding write, this publishes the contiguous run of completed
    /// writes by advancing `stop`.
    pub(crate) fn release(&self, w_start: usize, after_stop: &AtomicUsize, stop: &AtomicUsize) {
        let mut nodes = self.nodes.lock().unwrap();

        let Some(pos) = nodes.iter().position(|&n| n == w_start) else {
            debug_assert!(false, "release of a write node not present in the list");
            return;
        };
        let was_oldest = pos == 0;
        nodes.remove(pos);

        if was_oldest {
            let new_stop = nodes
                .front()
                .copied()
                .unwrap_or_else(|| after_stop.load(Ordering::Relaxed));
            stop.store(new_stop, Ordering::Release);
            tracing::trace!(w_start, new_stop, "write region published");
        } else {
            tracing::trace!(w_start, "write lease released, publish deferred to an older lease");
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }
}
