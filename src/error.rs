use thiserror::Error;

/// Failure of a synchronous lease acquisition or a bounds-checked index.
///
/// `OutOfRange` never indicates a state change: whichever operation returned
/// it left the ring exactly as it found it. Callers can retry (directly, or
/// through [`Ring::async_prepare`](crate::Ring::async_prepare) /
/// [`Ring::async_read`](crate::Ring::async_read), which swallow this error
/// and keep waiting) or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OutOfRange {
    /// A `prepare`/`read` request asked for more elements than are currently
    /// lendable.
    #[error("requested {requested} elements but only {available} are available")]
    Lease {
        /// How many elements the caller asked for.
        requested: usize,
        /// How many elements the manager could actually lend right now.
        available: usize,
    },
    /// An `at(i)` index fell at or beyond the ring's published `size()`.
    #[error("index {index} is out of range for size {size}")]
    Index {
        /// The index that was requested.
        index: usize,
        /// The ring's `size()` at the time of the request.
        size: usize,
    },
}
