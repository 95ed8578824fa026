//! Configuration for the 3Q concurrent LRU cache.

use std::fmt;

/// Configuration for a [`ConcurrentLruCache`](crate::ConcurrentLruCache).
///
/// `max_size` must be greater than
/// [`MIN_MAX_SIZE`](crate::lru::MIN_MAX_SIZE); the cache checks this in
/// `from_config`.
///
/// # Examples
///
/// ```
/// use segcache::config::ConcurrentLruCacheConfig;
/// use segcache::ConcurrentLruCache;
///
/// let config = ConcurrentLruCacheConfig::new(1000);
/// let cache: ConcurrentLruCache<u32, u32> = ConcurrentLruCache::from_config(config).unwrap();
/// assert_eq!(cache.max_size(), 1000);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ConcurrentLruCacheConfig {
    max_size: usize,
}

impl ConcurrentLruCacheConfig {
    /// Creates a configuration holding at most `max_size` entries at rest.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// Maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl fmt::Debug for ConcurrentLruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentLruCacheConfig")
            .field("max_size", &self.max_size)
            .finish()
    }
}
