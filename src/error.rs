//! Error types returned by cache constructors.
//!
//! Cache operations themselves never fail: keys and values are owned Rust
//! values, so the "null key" class of errors cannot be expressed. The only
//! fallible step is construction, where the requested geometry is validated.

/// The error type for cache construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The requested capacity cannot be served by the cache geometry.
    ///
    /// For [`SegmentLfuCache`](crate::SegmentLfuCache) the minimum depends on
    /// the number of segments; for [`ConcurrentLruCache`](crate::ConcurrentLruCache)
    /// it is a fixed lower bound.
    #[error("the parameter 'max_size' is too small: requested {requested}, must be greater than {minimum}")]
    CapacityTooSmall {
        /// The capacity passed by the caller.
        requested: usize,
        /// The smallest capacity the cache accepts.
        minimum: usize,
    },

    /// A segment hash table size that is not a power of two.
    #[error("invalid segment entry size {0}: must be a non-zero power of two")]
    InvalidEntrySize(usize),
}
