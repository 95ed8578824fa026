#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Which Cache?
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Shared between threads?                                             │
//! │                                                                      │
//! │    No ──▶ LruHashMap (exact LRU) or MapAsCache<any map>              │
//! │                                                                      │
//! │    Yes ─▶ Many writer threads, large cache?                          │
//! │             Yes ──▶ SegmentLfuCache   (lock striping, clock-LFU)     │
//! │             No  ──▶ ConcurrentLruCache (one lock, 3Q approx. LRU)    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Eviction | Locking | Size bound |
//! |------|----------|---------|------------|
//! | [`SegmentLfuCache`] | clock-approximated LFU per segment | one mutex per segment | exact |
//! | [`ConcurrentLruCache`] | three-round approximate LRU | one mutex | `max_size`, rare transient overshoot |
//! | [`LruHashMap`] | exact LRU | none (`&mut self`) | exact |
//! | [`MapAsCache`] / [`SyncMapCache`] | whatever the map does | none / one mutex | the map's |
//!
//! ## Code Examples
//!
//! ### Segmented LFU
//!
//! ```rust
//! use segcache::SegmentLfuCache;
//!
//! let cache = SegmentLfuCache::new(2048, 16).unwrap();
//! for i in 0..2048 {
//!     cache.put(format!("nice{i}"), i);
//! }
//! assert_eq!(cache.size(), 2048);
//!
//! cache.put("nice2048".to_string(), 2048);
//! assert_eq!(cache.size(), 2048);
//! ```
//!
//! ### 3Q LRU
//!
//! ```rust
//! use segcache::ConcurrentLruCache;
//!
//! let cache = ConcurrentLruCache::new(100).unwrap();
//! cache.put("demo", 33);
//! assert_eq!(cache.size(), 1);
//! assert_eq!(cache.remove(&"demo"), Some(33));
//! assert_eq!(cache.size(), 0);
//! ```
//!
//! ### Writing code against any cache
//!
//! ```rust
//! use segcache::{Cache, LruHashMap, MapAsCache};
//! use std::collections::HashMap;
//! use std::num::NonZeroUsize;
//!
//! fn fill<C: Cache<u32, u32>>(cache: &mut C) -> usize {
//!     for i in 0..10 {
//!         cache.put(i, i * 2);
//!     }
//!     cache.size()
//! }
//!
//! assert_eq!(fill(&mut LruHashMap::new(NonZeroUsize::new(4).unwrap())), 4);
//! assert_eq!(fill(&mut MapAsCache::new(HashMap::new())), 10);
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: the [`Cache`] trait
//! - [`lfu`]: segmented LFU cache
//! - [`lru`]: 3Q concurrent LRU cache
//! - [`lru_map`]: access-ordered LRU map
//! - [`map_cache`]: map-to-cache adapters
//! - [`config`]: configuration structures for the caches
//! - [`metrics`]: metrics reported by every cache
//! - [`error`]: construction errors

/// Index-based node storage shared by the intrusive lists.
pub(crate) mod arena;

/// Doubly linked list with stable index handles, used by [`LruHashMap`].
pub(crate) mod list;

/// Key hashing and hash spreading.
pub(crate) mod hash;

/// Bucket store with a clock-rotated LFU ring; the shard type of
/// [`SegmentLfuCache`].
pub(crate) mod segment;

/// Three-round LRU list used by [`ConcurrentLruCache`].
pub(crate) mod three_q;

/// The cache contract.
pub mod cache;

/// Cache configuration structures.
///
/// One configuration struct per cache, built with `new` plus `with_*`
/// methods and passed to the cache's `from_config`.
pub mod config;

/// Error types.
pub mod error;

/// Segmented LFU cache.
///
/// Partitions keys across independently locked segments, each evicting with a
/// clock approximation of LFU.
pub mod lfu;

/// Concurrent 3Q LRU cache.
///
/// A single-lock cache that approximates LRU with three rolling rounds of
/// visit timestamps.
pub mod lru;

/// Access-ordered LRU map.
pub mod lru_map;

/// Adapters exposing maps as caches.
pub mod map_cache;

/// Cache metrics system.
///
/// Every cache counts hits, misses, insertions and evictions and reports them
/// through the [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

pub use cache::Cache;
pub use error::CacheError;
pub use lfu::SegmentLfuCache;
pub use lru::ConcurrentLruCache;
pub use lru_map::LruHashMap;
pub use map_cache::{BackingMap, MapAsCache, SyncMapCache};
pub use metrics::CacheMetrics;
