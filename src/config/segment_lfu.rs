//! Configuration for the segmented LFU cache.
//!
//! # Sizing
//!
//! The requested concurrency is clamped to `16..=16384` and rounded up to a
//! power of two; that is the number of segments. Each segment gets a hash
//! table of at least 128 buckets sized for a 0.75 load factor, so the
//! smallest accepted `max_size` grows with the segment count:
//!
//! ```text
//! max_size / (segments * 0.75) + 1 >= 128
//! ```
//!
//! With the default 16 segments that is roughly 1,524 entries.

use std::fmt;

/// Default concurrency level: the minimum number of segments.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Configuration for a [`SegmentLfuCache`](crate::SegmentLfuCache).
///
/// # Examples
///
/// ```
/// use segcache::config::SegmentLfuCacheConfig;
///
/// let config = SegmentLfuCacheConfig::new(100_000).with_concurrency(64);
/// assert_eq!(config.max_size(), 100_000);
/// assert_eq!(config.concurrency(), 64);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SegmentLfuCacheConfig {
    max_size: usize,
    concurrency: usize,
}

impl SegmentLfuCacheConfig {
    /// Creates a configuration holding at most `max_size` entries, with the
    /// default concurrency level.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets the estimated number of concurrently updating threads.
    ///
    /// The cache rounds this to its segment count; see the module docs.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Requested concurrency level.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

impl fmt::Debug for SegmentLfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentLfuCacheConfig")
            .field("max_size", &self.max_size)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_lfu_config_defaults() {
        let config = SegmentLfuCacheConfig::new(2048);
        assert_eq!(config.max_size(), 2048);
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_segment_lfu_config_with_concurrency() {
        let config = SegmentLfuCacheConfig::new(2048).with_concurrency(3);
        assert_eq!(config.concurrency(), 3);
        let dbg = format!("{config:?}");
        assert!(dbg.contains("max_size: 2048"));
    }
}
