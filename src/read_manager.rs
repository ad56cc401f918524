//! The read-side lease manager: hands out [`ReadLease`](crate::lease::ReadLease)s
//! over published data and reclaims capacity oldest-release-first.

use crate::error::OutOfRange;
use crate::ring::dist;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Owns the read-side node list and its mutex. Symmetric to
/// [`WriteManager`](crate::write_manager::WriteManager); see its doc comment
/// for why the cursors themselves live on the `Ring` rather than here.
pub(crate) struct ReadManager {
    /// Outstanding read-node cursor values, oldest first.
    nodes: Mutex<VecDeque<usize>>,
}

impl ReadManager {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Mutex::new(VecDeque::new()),
        }
    }

    /// Lends `n` elements of published data, or fails with `OutOfRange` if
    /// fewer than `n` are available. Returns the half-open `[r_start,
    /// r_stop)` range to give the new lease.
    pub(crate) fn lend(
        &self,
        capacity: usize,
        n: usize,
        start: &AtomicUsize,
        stop: &AtomicUsize,
    ) -> Result<(usize, usize), OutOfRange> {
        let mut nodes = self.nodes.lock().unwrap();

        let begin = start.load(Ordering::Relaxed);
        let end = stop.load(Ordering::Acquire);
        // R=0: no anti-aliasing reservation needed on the read side.
        let available = dist(capacity, begin, end);

        if n > available {
            return Err(OutOfRange::Lease {
                requested: n,
                available,
            });
        }

        let r_start = begin;
        let r_stop = (r_start + n) % capacity;
        nodes.push_back(r_start);
        start.store(r_stop, Ordering::Release);

        tracing::trace!(r_start, r_stop, requested = n, "read lease acquired");

        Ok((r_start, r_stop))
    }

    /// Lends everything currently published (possibly zero elements).
    pub(crate) fn lend_all(
        &self,
        capacity: usize,
        start: &AtomicUsize,
        stop: &AtomicUsize,
    ) -> (usize, usize) {
        let mut nodes = self.nodes.lock().unwrap();

        let begin = start.load(Ordering::Relaxed);
        let end = stop.load(Ordering::Acquire);
        let available = dist(capacity, begin, end);

        let r_start = begin;
        let r_stop = (r_start + available) % capacity;
        nodes.push_back(r_start);
        start.store(r_stop, Ordering::Release);

        tracing::trace!(r_start, r_stop, "read lease acquired (lend_all)");

        (r_start, r_stop)
    }

    /// Releases the lease whose node was `r_start`. If it was the oldest
    /// outstanding read, this reclaims the contiguous run of completed reads
    /// by advancing `before_start`.
    pub(crate) fn release(&self, r_start: usize, start: &AtomicUsize, before_start: &AtomicUsize) {
        let mut nodes = self.nodes.lock().unwrap();

        let Some(pos) = nodes.iter().position(|&n| n == r_start) else {
            debug_assert!(false, "release of a read node not present in the list");
            return;
        };
        let was_oldest = pos == 0;
        nodes.remove(pos);

        if was_oldest {
            let new_before = nodes
                .front()
                .copied()
                .unwrap_or_else(|| start.load(Ordering::Relaxed));
            before_start.store(new_before, Ordering::Release);
            tracing::trace!(r_start, new_before, "read region reclaimed");
        } else {
            tracing::trace!(r_start, "read lease released, reclaim deferred to an older lease");
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }
}
