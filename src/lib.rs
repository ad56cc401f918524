//! ringlease-rs — a bounded, lock-synchronised FIFO ring buffer with
//! zero-copy, move-only read/write leases.
//!
//! A [`Ring<T, N>`] is a fixed-capacity circular buffer of `N` slots. Instead
//! of copying elements in and out, producers and consumers borrow a
//! contiguous, in-place window onto the buffer:
//!
//! - [`Ring::prepare`]/[`Ring::prepare_all`] hand out a [`WriteLease`], a
//!   scoped, move-only handle over unused capacity. Filling it in place and
//!   dropping it publishes the range to readers.
//! - [`Ring::read`]/[`Ring::read_all`] hand out a [`ReadLease`] over
//!   published data. Dropping it retires the range and returns its capacity
//!   to writers.
//!
//! Multiple leases of the same kind can be outstanding at once — acquisition
//! is out-of-order, but a manager only ever advances its shared cursor when
//! the *oldest* outstanding lease of that kind is released, so publication
//! and reclamation always happen in FIFO order regardless of which lease
//! finishes first. [`Ring::async_prepare`]/[`Ring::async_read`] offer the
//! same acquisition, yielding to the executor instead of failing when the
//! ring can't currently satisfy the request.
//!
//! # Example
//!
//! ```
//! use ringlease_rs::Ring;
//!
//! let ring: Ring<u64, 8> = Ring::new();
//!
//! {
//!     let mut lease = ring.prepare(3).unwrap();
//!     for (i, slot) in lease.iter_mut().enumerate() {
//!         *slot = i as u64;
//!     }
//! } // publishes [0, 1, 2] on drop
//!
//! {
//!     let lease = ring.read_all();
//!     assert_eq!(lease.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
//! } // retires the range on drop
//! ```

mod error;
mod lease;
mod read_manager;
mod ring;
mod storage;
mod waiter;
mod write_manager;

pub use error::OutOfRange;
pub use lease::{LeaseIter, LeaseIterMut, ReadLease, WriteLease};
pub use ring::{Ring, RingIter};
pub use storage::{ArrayStorage, RingStorage};
