//! The contiguous backing buffer behind a [`Ring`](crate::Ring).
//!
//! The ring never allocates or resizes storage itself; it only ever indexes
//! into a `RingStorage` it was handed at construction time. The default,
//! [`ArrayStorage`], is an inline `[T; N]` built by default-constructing each
//! slot, matching the "stack array" default from the storage configuration
//! surface. Anyone who needs a heap-backed or externally-owned buffer can
//! implement the trait themselves.

/// A fixed-size, contiguous range of `T` that a [`Ring`](crate::Ring) can use
/// as its backing storage.
///
/// Implementors must always expose the same length (the ring's const
/// generic `N`) for the lifetime of the value — the ring never resizes its
/// storage.
pub trait RingStorage<T> {
    /// Returns the backing slots as a contiguous, read-only slice.
    fn as_slice(&self) -> &[T];

    /// Returns the backing slots as a contiguous, mutable slice.
    fn as_mut_slice(&mut self) -> &mut [T];
}

/// The default `RingStorage`: an inline `[T; N]` array, no heap allocation.
pub struct ArrayStorage<T, const N: usize>([T; N]);

impl<T, const N: usize> RingStorage<T> for ArrayStorage<T, N> {
    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.0
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T: Default, const N: usize> Default for ArrayStorage<T, N> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T, const N: usize> From<[T; N]> for ArrayStorage<T, N> {
    fn from(slots: [T; N]) -> Self {
        Self(slots)
    }
}
