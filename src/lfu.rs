//! Segmented LFU Cache Implementation
//!
//! A thread-safe LFU cache built from many small independently locked hash
//! tables, much like a striped concurrent hash map. Every operation locks
//! only the segment its key hashes to, so threads touching different
//! segments never wait on each other.
//!
//! # How It Works
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        SegmentLfuCache                               │
//! │                                                                      │
//! │  spread(hash(key)) >> shift & mask  ──▶  Segment Selection           │
//! │                                                                      │
//! │  ┌──────────────┐ ┌──────────────┐     ┌──────────────┐              │
//! │  │  Segment 0   │ │  Segment 1   │ ... │  Segment N-1 │              │
//! │  │  [Mutex]     │ │  [Mutex]     │     │  [Mutex]     │              │
//! │  │  buckets     │ │  buckets     │     │  buckets     │              │
//! │  │  clock ring  │ │  clock ring  │     │  clock ring  │              │
//! │  └──────────────┘ └──────────────┘     └──────────────┘              │
//! │                                                                      │
//! │  size: AtomicUsize          next_victim_segment: AtomicUsize         │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The entry count is global. When a put of a new key pushes it over
//! `max_size`, the putting thread asks segments for a victim in round-robin
//! order, starting where the previous eviction left off, until one segment
//! evicts an entry. Each segment approximates LFU with a clock sweep over its
//! entries' visit counters and bounds the work of a single sweep, so a put
//! never scans a whole segment.
//!
//! # Trade-offs
//!
//! - **Pros**: independent locks; O(1) lookups; eviction cost bounded per put
//! - **Cons**: frequency is approximated by a decaying counter, and victims
//!   are chosen per segment, so the evicted entry is a local rather than a
//!   global LFU minimum
//!
//! # Example
//!
//! ```rust
//! use segcache::SegmentLfuCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(SegmentLfuCache::new(4096, 16).unwrap());
//!
//! let handles: Vec<_> = (0..4).map(|t| {
//!     let cache = Arc::clone(&cache);
//!     thread::spawn(move || {
//!         for i in 0..2000 {
//!             cache.put(format!("key-{t}-{i}"), i);
//!         }
//!     })
//! }).collect();
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert!(cache.size() <= 4096);
//! ```

use crate::cache::Cache;
use crate::config::SegmentLfuCacheConfig;
use crate::error::CacheError;
use crate::hash::{hash_key, spread_segmented};
use crate::metrics::{CacheMetrics, SegmentLfuMetrics};
use crate::segment::Segment;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::sync::atomic::{AtomicUsize, Ordering};
use hashbrown::DefaultHashBuilder;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Upper bound on the number of segments.
pub const MAX_SEGMENTS: usize = 1 << 14;

/// Lower bound on the number of segments.
pub const MIN_SEGMENTS: usize = 16;

/// Minimum number of hash buckets in one segment.
pub const MIN_TABLE_ITEM: usize = 1 << 7;

/// Segment count and per-segment table size derived from the constructor
/// arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    segments: usize,
    segment_shift: u32,
    entry_size: usize,
}

impl Geometry {
    fn compute(max_size: usize, concurrency: usize) -> Result<Self, CacheError> {
        let concurrency = concurrency.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
        let segments = concurrency.next_power_of_two();
        let segment_shift = 32 - segments.trailing_zeros();

        // Size the tables for a 0.75 load factor.
        let emax = max_size / (segments * 3 / 4) + 1;
        if emax < MIN_TABLE_ITEM {
            return Err(CacheError::CapacityTooSmall {
                requested: max_size,
                minimum: segments * MIN_TABLE_ITEM,
            });
        }
        let entry_size = emax.next_power_of_two();

        Ok(Self {
            segments,
            segment_shift,
            entry_size,
        })
    }
}

/// A thread-safe LFU cache with lock-striped segments.
///
/// # Examples
///
/// ```
/// use segcache::SegmentLfuCache;
///
/// let cache = SegmentLfuCache::new(2048, 16).unwrap();
/// assert_eq!(cache.put("apple", 1), None);
/// assert_eq!(cache.put("apple", 2), Some(1));
/// assert_eq!(cache.get(&"apple"), Some(2));
/// assert_eq!(cache.remove(&"apple"), Some(2));
/// assert_eq!(cache.size(), 0);
/// ```
pub struct SegmentLfuCache<K, V, S = DefaultHashBuilder> {
    segments: Box<[Mutex<Segment<K, V>>]>,
    segment_shift: u32,
    segment_mask: u32,
    max_size: usize,
    size: AtomicUsize,
    next_victim_segment: AtomicUsize,
    hash_builder: S,
}

impl<K, V> SegmentLfuCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Creates a cache holding at most `max_size` entries.
    ///
    /// `concurrency` is the estimated number of concurrently updating
    /// threads. It is clamped to `16..=16384` and rounded up to a power of
    /// two to give the segment count.
    ///
    /// # Errors
    ///
    /// [`CacheError::CapacityTooSmall`] when `max_size` cannot give every
    /// segment at least 128 buckets at a 0.75 load factor.
    pub fn new(max_size: usize, concurrency: usize) -> Result<Self, CacheError> {
        Self::with_hasher(max_size, concurrency, DefaultHashBuilder::default())
    }

    /// Creates a cache from a [`SegmentLfuCacheConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`SegmentLfuCache::new`].
    pub fn from_config(config: SegmentLfuCacheConfig) -> Result<Self, CacheError> {
        Self::new(config.max_size(), config.concurrency())
    }
}

impl<K, V, S> SegmentLfuCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    /// Creates a cache that hashes keys with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Same as [`SegmentLfuCache::new`].
    pub fn with_hasher(
        max_size: usize,
        concurrency: usize,
        hash_builder: S,
    ) -> Result<Self, CacheError> {
        let geometry = Geometry::compute(max_size, concurrency)?;

        let segments = (0..geometry.segments)
            .map(|_| Segment::new(geometry.entry_size).map(Mutex::new))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "created segmented LFU cache: max_size={}, segments={}, buckets_per_segment={}",
            max_size,
            geometry.segments,
            geometry.entry_size
        );

        #[allow(clippy::cast_possible_truncation)]
        let segment_mask = (geometry.segments - 1) as u32;

        Ok(Self {
            segments: segments.into_boxed_slice(),
            segment_shift: geometry.segment_shift,
            segment_mask,
            max_size,
            size: AtomicUsize::new(0),
            next_victim_segment: AtomicUsize::new(0),
            hash_builder,
        })
    }

    #[inline]
    fn hash<Q>(&self, key: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        spread_segmented(hash_key(&self.hash_builder, key))
    }

    /// The upper bits of the spread hash choose the segment; the lower bits
    /// are left for the bucket inside it.
    #[inline]
    fn segment_for(&self, hash: u32) -> &Mutex<Segment<K, V>> {
        let idx = (hash >> self.segment_shift) & self.segment_mask;
        &self.segments[idx as usize]
    }

    /// Number of entries in the cache.
    ///
    /// Exact when no other thread is mutating the cache.
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The configured maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of segments, after clamping and rounding.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns a clone of the value for `key` and counts one visit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        self.segment_for(hash).lock().get(hash, key)
    }

    /// Returns `true` if the cache holds `key`. Does not count as a visit.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        self.segment_for(hash).lock().find_item(hash, key).is_some()
    }

    /// Maps `key` to `value` and returns the previous value.
    ///
    /// Overwriting an existing key counts one visit for it. Inserting a new
    /// key beyond `max_size` evicts one entry before returning.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let hash = self.hash(&key);
        let mut over_quota = false;
        let old = {
            let mut segment = self.segment_for(hash).lock();
            let old = segment.put(hash, key, value);
            // The counter only moves under the lock of the segment that
            // changed, so it never drops below the number of live entries.
            if old.is_none() {
                over_quota = self.size.fetch_add(1, Ordering::AcqRel) >= self.max_size;
            }
            old
        };
        if over_quota {
            self.evict_one();
        }
        old
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        let mut segment = self.segment_for(hash).lock();
        let removed = segment.remove(hash, key);
        if removed.is_some() {
            self.size.fetch_sub(1, Ordering::AcqRel);
        }
        removed
    }

    /// Removes every entry. Metrics are kept.
    pub fn clear(&self) {
        for segment in self.segments.iter() {
            let mut segment = segment.lock();
            let n = segment.size();
            segment.clear();
            self.size.fetch_sub(n, Ordering::AcqRel);
        }
    }

    /// Asks segments for a victim in round-robin order until one is evicted.
    ///
    /// Stops early if concurrent removals already brought the cache back
    /// within `max_size`. Only one segment lock is held at a time.
    fn evict_one(&self) {
        let mut attempts = 0usize;
        while self.size.load(Ordering::Acquire) > self.max_size {
            let idx = self.next_victim_segment.fetch_add(1, Ordering::Relaxed);
            let evicted = {
                let mut segment = self.segments[idx & self.segment_mask as usize].lock();
                let evicted = segment.eviction();
                if evicted > 0 {
                    self.size.fetch_sub(evicted, Ordering::AcqRel);
                }
                evicted
            };
            attempts += 1;
            if evicted > 0 {
                log::trace!("evicted {} entries after {} sweeps", evicted, attempts);
                return;
            }
        }
    }

    /// Snapshot of the metrics of every segment, summed.
    pub fn segment_metrics(&self) -> SegmentLfuMetrics {
        let mut total = SegmentLfuMetrics::new();
        for segment in self.segments.iter() {
            total.merge(segment.lock().metrics());
        }
        total
    }
}

impl<K, V, S> Cache<K, V> for SegmentLfuCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn size(&self) -> usize {
        SegmentLfuCache::size(self)
    }

    fn get(&mut self, key: &K) -> Option<V> {
        SegmentLfuCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        SegmentLfuCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        SegmentLfuCache::remove(self, key)
    }
}

impl<K, V, S> CacheMetrics for SegmentLfuCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment_metrics().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "SegmentLFU"
    }
}

impl<K, V, S> core::fmt::Debug for SegmentLfuCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SegmentLfuCache")
            .field("max_size", &self.max_size)
            .field("size", &self.size.load(Ordering::Relaxed))
            .field("segment_count", &self.segments.len())
            .finish()
    }
}
