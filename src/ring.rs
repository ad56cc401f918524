use crate::error::OutOfRange;
use crate::lease::{ReadLease, WriteLease};
use crate::read_manager::ReadManager;
use crate::storage::{ArrayStorage, RingStorage};
use crate::waiter::yield_once;
use crate::write_manager::WriteManager;
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Circular distance from `a` to `b` on an axis of length `capacity`.
#[inline]
pub(crate) const fn dist(capacity: usize, a: usize, b: usize) -> usize {
    if b >= a {
        b - a
    } else {
        capacity - a + b
    }
}

/// A bounded FIFO ring buffer of `N` slots of `T`, leased out for zero-copy
/// in-place reading and writing.
///
/// # Cursor model
///
/// Four cursors partition the ring, in order, into four regions:
/// `before_start..start` (leased out for reading), `start..stop` (published,
/// readable data — [`size`](Ring::size) is `dist(start, stop)`),
/// `stop..after_stop` (leased out for writing), and `after_stop..before_start`
/// (free capacity). Exactly one slot is permanently held back to disambiguate
/// a full ring from an empty one, so [`max_size`](Ring::max_size) is `N - 1`.
///
/// `before_start`/`start` are owned by the read manager; `stop`/`after_stop`
/// are owned by the write manager. Each manager only ever writes its own
/// pair and reads its peer's pair, so the two managers never contend on the
/// same mutex — see [`WriteManager`] and [`ReadManager`].
pub struct Ring<T, const N: usize, S: RingStorage<T> = ArrayStorage<T, N>> {
    storage: UnsafeCell<S>,
    pub(crate) before_start: AtomicUsize,
    pub(crate) start: AtomicUsize,
    pub(crate) stop: AtomicUsize,
    pub(crate) after_stop: AtomicUsize,
    pub(crate) write_manager: CachePadded<WriteManager>,
    pub(crate) read_manager: CachePadded<ReadManager>,
    _marker: PhantomData<T>,
}

// SAFETY: `Ring` hands out leases that alias disjoint ranges of `storage`
// under the protocol enforced by the two managers; it never hands out two
// leases covering the same slot. `T: Send` is required because a value
// written on the producer's thread is observed on the consumer's thread.
unsafe impl<T: Send, const N: usize, S: RingStorage<T> + Send> Send for Ring<T, N, S> {}
unsafe impl<T: Send, const N: usize, S: RingStorage<T> + Send> Sync for Ring<T, N, S> {}

impl<T, const N: usize, S: RingStorage<T> + Default> Default for Ring<T, N, S> {
    fn default() -> Self {
        Self::from_storage(S::default())
    }
}

impl<T, const N: usize, S: RingStorage<T> + Default> Ring<T, N, S> {
    /// Creates a new ring with default-constructed storage.
    ///
    /// # Panics
    ///
    /// Panics if `N == 0`.
    pub fn new() -> Self {
        Self::from_storage(S::default())
    }
}

impl<T, const N: usize, S: RingStorage<T>> Ring<T, N, S> {
    /// Creates a new ring wrapping caller-supplied storage.
    ///
    /// `storage` must expose exactly `N` slots; a shorter or longer slice
    /// will cause out-of-bounds panics the first time a lease touches the
    /// missing slots.
    ///
    /// # Panics
    ///
    /// Panics if `N == 0`.
    pub fn from_storage(storage: S) -> Self {
        assert!(N > 0, "Ring capacity must be > 0");
        debug_assert_eq!(
            storage.as_slice().len(),
            N,
            "RingStorage must expose exactly N slots"
        );

        tracing::debug!(capacity = N, "ring constructed");

        Self {
            storage: UnsafeCell::new(storage),
            before_start: AtomicUsize::new(0),
            start: AtomicUsize::new(0),
            stop: AtomicUsize::new(0),
            after_stop: AtomicUsize::new(0),
            write_manager: CachePadded::new(WriteManager::new()),
            read_manager: CachePadded::new(ReadManager::new()),
            _marker: PhantomData,
        }
    }

    // -------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------

    /// The fixed capacity `N` this ring was created with.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The maximum number of elements that can be live at once: `N - 1`.
    #[inline]
    pub const fn max_size(&self) -> usize {
        N - 1
    }

    /// The number of published elements currently readable: `dist(start, stop)`.
    ///
    /// Does not count elements inside an open write lease that hasn't been
    /// released yet.
    #[inline]
    pub fn size(&self) -> usize {
        dist(N, self.start.load(Ordering::Acquire), self.stop.load(Ordering::Acquire))
    }

    /// `true` iff `size() == 0`.
    #[inline]
    pub fn empty(&self) -> bool {
        self.start.load(Ordering::Acquire) == self.stop.load(Ordering::Acquire)
    }

    /// `true` iff lendable write capacity is zero.
    #[inline]
    pub fn full(&self) -> bool {
        let stop = self.stop.load(Ordering::Acquire);
        let start = self.start.load(Ordering::Acquire);
        (stop + 1) % N == start
    }

    // -------------------------------------------------------------------
    // Direct access to published data
    // -------------------------------------------------------------------

    /// The first published element (`storage[start]`).
    ///
    /// Indexes position `0` of the published region through the `Index`
    /// impl below, which performs no bounds check at all — on an empty ring
    /// this silently returns whatever stale slot `start` currently points
    /// at rather than panicking. Use [`Ring::at`] for a checked read.
    #[inline]
    pub fn front(&self) -> &T {
        &self[0]
    }

    /// The last published element.
    ///
    /// # Panics
    ///
    /// Computes `size() - 1` before indexing, so in a debug build this
    /// panics (integer-overflow check) if the ring is empty. In a release
    /// build the subtraction wraps instead, and the resulting `Index` call
    /// silently returns a stale slot rather than panicking — see the
    /// `Index` impl below. Use [`Ring::at`] for a checked read.
    #[inline]
    pub fn back(&self) -> &T {
        let len = self.size();
        &self[len - 1]
    }

    /// Bounds-checked indexed access into the published region.
    pub fn at(&self, i: usize) -> Result<&T, OutOfRange> {
        let size = self.size();
        if i >= size {
            return Err(OutOfRange::Index { index: i, size });
        }
        Ok(&self[i])
    }

    /// An iterator over the published region, in logical (FIFO) order.
    pub fn iter(&self) -> RingIter<'_, T, N, S> {
        RingIter {
            ring: self,
            front: 0,
            back: self.size(),
        }
    }

    /// Resets all four cursors to zero, discarding the notion of any
    /// previously published data (the underlying slots are left as-is).
    ///
    /// # Panics
    ///
    /// In debug builds, panics if any write or read lease is currently
    /// outstanding. In release builds this precondition is unchecked and
    /// violating it is undefined behaviour, matching the source contract.
    pub fn clear(&self) {
        debug_assert_eq!(
            self.write_manager.outstanding(),
            0,
            "clear() called with an outstanding write lease"
        );
        debug_assert_eq!(
            self.read_manager.outstanding(),
            0,
            "clear() called with an outstanding read lease"
        );
        self.before_start.store(0, Ordering::Release);
        self.start.store(0, Ordering::Release);
        self.stop.store(0, Ordering::Release);
        self.after_stop.store(0, Ordering::Release);

        tracing::debug!("ring cleared");
    }

    // -------------------------------------------------------------------
    // Leasing
    // -------------------------------------------------------------------

    /// Synchronously leases `n` slots of unused capacity for writing.
    ///
    /// Fails with `OutOfRange` (leaving the ring unchanged) if fewer than
    /// `n` slots are currently free.
    pub fn prepare(&self, n: usize) -> Result<WriteLease<'_, T, N, S>, OutOfRange> {
        let (lo, hi) = self.write_manager.lend(N, n, &self.after_stop, &self.before_start)?;
        Ok(WriteLease::new(self, lo, hi))
    }

    /// Synchronously leases all currently free capacity for writing
    /// (possibly an empty lease).
    pub fn prepare_all(&self) -> WriteLease<'_, T, N, S> {
        let (lo, hi) = self.write_manager.lend_all(N, &self.after_stop, &self.before_start);
        WriteLease::new(self, lo, hi)
    }

    /// Synchronously leases `n` slots of published data for reading.
    ///
    /// Fails with `OutOfRange` (leaving the ring unchanged) if fewer than
    /// `n` elements are currently published.
    pub fn read(&self, n: usize) -> Result<ReadLease<'_, T, N, S>, OutOfRange> {
        let (lo, hi) = self.read_manager.lend(N, n, &self.start, &self.stop)?;
        Ok(ReadLease::new(self, lo, hi))
    }

    /// Synchronously leases all currently published data for reading
    /// (possibly an empty lease).
    pub fn read_all(&self) -> ReadLease<'_, T, N, S> {
        let (lo, hi) = self.read_manager.lend_all(N, &self.start, &self.stop);
        ReadLease::new(self, lo, hi)
    }

    /// Leases `n` slots of capacity for writing, yielding to the executor
    /// and retrying for as long as fewer than `n` slots are free.
    ///
    /// Never surfaces `OutOfRange`: a failed attempt simply becomes another
    /// iteration of the wait loop. Cancelling the returned future (e.g. by
    /// dropping it) leaves the ring exactly as it was before the call.
    pub async fn async_prepare(&self, n: usize) -> WriteLease<'_, T, N, S> {
        loop {
            match self.prepare(n) {
                Ok(lease) => return lease,
                Err(_) => yield_once().await,
            }
        }
    }

    /// Leases `n` slots of published data for reading, yielding to the
    /// executor and retrying for as long as fewer than `n` elements are
    /// published.
    pub async fn async_read(&self, n: usize) -> ReadLease<'_, T, N, S> {
        loop {
            match self.read(n) {
                Ok(lease) => return lease,
                Err(_) => yield_once().await,
            }
        }
    }

    // -------------------------------------------------------------------
    // Raw slot access (used by Ring's own accessors and by Lease)
    // -------------------------------------------------------------------

    /// # Safety
    ///
    /// The caller must ensure no other live reference (shared or mutable)
    /// currently aliases slot `idx`. The lease protocol guarantees this for
    /// every call site in this crate.
    #[inline]
    pub(crate) unsafe fn slot_ref(&self, idx: usize) -> &T {
        &(*self.storage.get()).as_slice()[idx]
    }

    /// # Safety
    ///
    /// See [`Ring::slot_ref`]; additionally the caller must ensure no other
    /// live reference of any kind aliases slot `idx` for the lifetime of the
    /// returned reference.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slot_mut(&self, idx: usize) -> &mut T {
        &mut (*self.storage.get()).as_mut_slice()[idx]
    }
}

/// Indexes into the published region, aliasing `storage[(start + i) % N]`.
///
/// Performs no bounds check against `size()`: an out-of-range `i` still
/// lands on a valid array slot via the modulo and silently returns
/// whatever stale value is there instead of panicking. Use [`Ring::at`]
/// for a checked index.
impl<T, const N: usize, S: RingStorage<T>> std::ops::Index<usize> for Ring<T, N, S> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        let idx = (self.start.load(Ordering::Acquire) + i) % N;
        // SAFETY: the published region [start, stop) is never concurrently
        // written; only reads of already-committed data happen here.
        unsafe { self.slot_ref(idx) }
    }
}

impl<T: fmt::Debug, const N: usize, S: RingStorage<T>> fmt::Display for Ring<T, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ring {{ start: {}, stop: {}, size: {} }}",
            self.start.load(Ordering::Relaxed),
            self.stop.load(Ordering::Relaxed),
            self.size()
        )
    }
}

/// An iterator over a [`Ring`]'s published region, in FIFO order.
///
/// Finite, restartable (call [`Ring::iter`] again), and a random-access,
/// exact-size sequence: it supports both forward and backward traversal.
pub struct RingIter<'a, T, const N: usize, S: RingStorage<T>> {
    ring: &'a Ring<T, N, S>,
    front: usize,
    back: usize,
}

impl<'a, T, const N: usize, S: RingStorage<T>> Iterator for RingIter<'a, T, N, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        let item = &self.ring[self.front];
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<'a, T, const N: usize, S: RingStorage<T>> DoubleEndedIterator for RingIter<'a, T, N, S> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(&self.ring[self.back])
    }
}

impl<'a, T, const N: usize, S: RingStorage<T>> ExactSizeIterator for RingIter<'a, T, N, S> {}

impl<'a, T, const N: usize, S: RingStorage<T>> IntoIterator for &'a Ring<T, N, S> {
    type Item = &'a T;
    type IntoIter = RingIter<'a, T, N, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
