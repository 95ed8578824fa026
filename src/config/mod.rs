//! Cache Configuration Module
//!
//! One configuration struct per cache. Required parameters go through
//! `new`, optional ones through `#[must_use]` builder methods, and each cache
//! has a `from_config` constructor that validates the result.
//!
//! | Config | Cache |
//! |--------|-------|
//! | [`SegmentLfuCacheConfig`] | [`SegmentLfuCache`](crate::SegmentLfuCache) |
//! | [`ConcurrentLruCacheConfig`] | [`ConcurrentLruCache`](crate::ConcurrentLruCache) |
//! | [`LruHashMapConfig`] | [`LruHashMap`](crate::LruHashMap) |
//!
//! # Examples
//!
//! ```
//! use segcache::config::SegmentLfuCacheConfig;
//! use segcache::SegmentLfuCache;
//!
//! let config = SegmentLfuCacheConfig::new(4096).with_concurrency(32);
//! let cache: SegmentLfuCache<String, u64> = SegmentLfuCache::from_config(config).unwrap();
//! assert_eq!(cache.segment_count(), 32);
//! ```

pub mod concurrent_lru;
pub mod lru_map;
pub mod segment_lfu;

pub use concurrent_lru::ConcurrentLruCacheConfig;
pub use lru_map::LruHashMapConfig;
pub use segment_lfu::SegmentLfuCacheConfig;
