//! Configuration for the LRU map baseline.

use std::fmt;
use std::num::NonZeroUsize;

/// Configuration for an [`LruHashMap`](crate::LruHashMap).
///
/// # Examples
///
/// ```
/// use segcache::config::LruHashMapConfig;
/// use segcache::LruHashMap;
/// use std::num::NonZeroUsize;
///
/// let config = LruHashMapConfig::new(NonZeroUsize::new(64).unwrap());
/// let map: LruHashMap<String, u8> = LruHashMap::from_config(config);
/// assert_eq!(map.cap().get(), 64);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LruHashMapConfig {
    capacity: NonZeroUsize,
}

impl LruHashMapConfig {
    /// Creates a configuration holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
}

impl fmt::Debug for LruHashMapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruHashMapConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
