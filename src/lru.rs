//! Concurrent 3Q LRU Cache Implementation
//!
//! A thread-safe cache that approximates LRU with a three-round list:
//! instead of finding the exact least recently used entry, eviction takes
//! the first entry (from the cold end) that has not been visited during the
//! last two rounds of visits.
//!
//! # Algorithm
//!
//! - Time is a logical clock: every `get` hit and every `put` is one visit
//!   and advances it by one. Each entry records the time of its last visit.
//! - Every `victim_size = (max_size - 4) / 3` visits a new round begins and
//!   its start time is pushed into the list's round headers.
//! - Visited entries move to the head of the list.
//! - When a put of a new key takes the cache over `max_size`, the list is
//!   searched from the tail for an entry visited no later than the oldest
//!   round header, and that entry is evicted.
//!
//! If the search comes back empty the put still succeeds and the cache stays
//! one entry over its limit until a later put evicts again. Victim misses are
//! counted in the metrics.
//!
//! # Performance Characteristics
//!
//! - Get: O(1) plus bucket chain length
//! - Put: O(1) amortized; a victim search may walk part of the list
//! - Remove: O(1) plus bucket chain length
//!
//! # Thread Safety
//!
//! One [`parking_lot::Mutex`] guards the table and the list. The entry count
//! is mirrored in an atomic so [`ConcurrentLruCache::size`] never locks.
//!
//! # Example
//!
//! ```rust
//! use segcache::ConcurrentLruCache;
//!
//! let cache = ConcurrentLruCache::new(100).unwrap();
//! for i in 0..100 {
//!     cache.put(format!("k{i}"), i);
//! }
//! // k0 is visited, so k1 becomes the oldest entry.
//! assert_eq!(cache.get("k0"), Some(0));
//! cache.put("k100".to_string(), 100);
//!
//! assert_eq!(cache.size(), 100);
//! assert_eq!(cache.get("k0"), Some(0));
//! assert_eq!(cache.get("k1"), None);
//! ```

use crate::arena::Arena;
use crate::cache::Cache;
use crate::config::ConcurrentLruCacheConfig;
use crate::error::CacheError;
use crate::hash::{hash_key, spread_chained};
use crate::metrics::{CacheMetrics, ThreeQMetrics};
use crate::three_q::{LruNode, ThreeQLruList, NIL};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::sync::atomic::{AtomicUsize, Ordering};
use hashbrown::DefaultHashBuilder;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// `max_size` must be strictly greater than this.
pub const MIN_MAX_SIZE: usize = 50;

/// Key, value and bucket chain links of one cached entry.
struct LruEntry<K, V> {
    key: K,
    value: V,
    hash: u32,
    /// `NIL` at the head of the chain; the bucket slot points here instead.
    map_prev: usize,
    map_next: usize,
}

type Node<K, V> = LruNode<LruEntry<K, V>>;

/// State guarded by the cache lock.
struct Inner<K, V> {
    nodes: Arena<Node<K, V>>,
    /// Head node of each bucket chain, or `NIL`.
    table: Box<[usize]>,
    list: ThreeQLruList,
    tick: u64,
    visits: usize,
    metrics: ThreeQMetrics,
}

impl<K, V> Inner<K, V> {
    fn new(table_len: usize, max_size: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(max_size + 1),
            table: vec![NIL; table_len].into_boxed_slice(),
            list: ThreeQLruList::new(),
            tick: 0,
            visits: 0,
            metrics: ThreeQMetrics::new(),
        }
    }

    #[inline]
    fn index_for(&self, hash: u32) -> usize {
        hash as usize % self.table.len()
    }

    /// Advances the clock by one visit and returns the new time.
    fn add_visit(&mut self, victim_size: usize) -> u64 {
        self.tick += 1;
        self.visits += 1;
        if self.visits >= victim_size {
            self.visits = 0;
            self.list.push_header_time(self.tick);
        }
        self.tick
    }

    fn find<Q>(&self, hash: u32, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.table[self.index_for(hash)];
        while cur != NIL {
            let entry = &self.nodes[cur].item;
            if entry.hash == hash && entry.key.borrow() == key {
                return Some(cur);
            }
            cur = entry.map_next;
        }
        None
    }

    /// Records a visit to `idx` and moves it to the head of the list.
    fn touch(&mut self, idx: usize, victim_size: usize) {
        let now = self.add_visit(victim_size);
        self.nodes[idx].last_visit_at = now;
        self.list.move_to_head(&mut self.nodes, idx);
    }

    /// Links `idx` at the front of its bucket chain.
    fn link_map(&mut self, idx: usize) {
        let bucket = self.index_for(self.nodes[idx].item.hash);
        let first = self.table[bucket];
        {
            let entry = &mut self.nodes[idx].item;
            entry.map_prev = NIL;
            entry.map_next = first;
        }
        if first != NIL {
            self.nodes[first].item.map_prev = idx;
        }
        self.table[bucket] = idx;
    }

    /// Unlinks `idx` from its bucket chain. Leaves the list untouched.
    fn unlink_map(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = &mut self.nodes[idx].item;
            let links = (entry.map_prev, entry.map_next);
            entry.map_prev = NIL;
            entry.map_next = NIL;
            links
        };
        if prev == NIL {
            let bucket = self.index_for(self.nodes[idx].item.hash);
            self.table[bucket] = next;
        } else {
            self.nodes[prev].item.map_next = next;
        }
        if next != NIL {
            self.nodes[next].item.map_prev = prev;
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.table.fill(NIL);
        self.list.clear();
        self.visits = 0;
    }
}

/// A thread-safe cache with approximate LRU eviction.
///
/// # Examples
///
/// ```
/// use segcache::ConcurrentLruCache;
///
/// let cache = ConcurrentLruCache::new(100).unwrap();
/// assert_eq!(cache.put("nice", 7788), None);
/// assert_eq!(cache.put("nice", 6688), Some(7788));
/// assert_eq!(cache.put("nlce", 7788), None);
/// assert_eq!(cache.size(), 2);
/// ```
pub struct ConcurrentLruCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<Inner<K, V>>,
    size: AtomicUsize,
    max_size: usize,
    victim_size: usize,
    hash_builder: S,
}

impl<K, V> ConcurrentLruCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Creates a cache holding at most `max_size` entries at rest.
    ///
    /// # Errors
    ///
    /// [`CacheError::CapacityTooSmall`] unless `max_size` is greater than
    /// [`MIN_MAX_SIZE`].
    pub fn new(max_size: usize) -> Result<Self, CacheError> {
        Self::with_hasher(max_size, DefaultHashBuilder::default())
    }

    /// Creates a cache from a [`ConcurrentLruCacheConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`ConcurrentLruCache::new`].
    pub fn from_config(config: ConcurrentLruCacheConfig) -> Result<Self, CacheError> {
        Self::new(config.max_size())
    }
}

impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    /// Creates a cache that hashes keys with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Same as [`ConcurrentLruCache::new`].
    pub fn with_hasher(max_size: usize, hash_builder: S) -> Result<Self, CacheError> {
        if max_size <= MIN_MAX_SIZE {
            return Err(CacheError::CapacityTooSmall {
                requested: max_size,
                minimum: MIN_MAX_SIZE,
            });
        }

        // max_size / 0.75, without overflowing.
        let table_len = max_size / 3 * 4 + max_size % 3 * 4 / 3;
        let victim_size = (max_size - 4) / 3;
        log::debug!(
            "created 3Q LRU cache: max_size={}, buckets={}, victim_size={}",
            max_size,
            table_len,
            victim_size
        );

        Ok(Self {
            inner: Mutex::new(Inner::new(table_len, max_size)),
            size: AtomicUsize::new(0),
            max_size,
            victim_size,
            hash_builder,
        })
    }

    #[inline]
    fn hash<Q>(&self, key: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        spread_chained(hash_key(&self.hash_builder, key))
    }

    /// The configured maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of entries in the cache.
    ///
    /// May exceed [`max_size`](Self::max_size) by a few entries when victim
    /// searches came back empty.
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns a clone of the value for `key`, counting one visit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        let mut inner = self.inner.lock();
        match inner.find(hash, key) {
            Some(idx) => {
                inner.touch(idx, self.victim_size);
                inner.metrics.core.record_hit();
                Some(inner.nodes[idx].item.value.clone())
            }
            None => {
                inner.metrics.core.record_miss();
                None
            }
        }
    }

    /// Returns `true` if the cache holds `key`. Does not count as a visit.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        self.inner.lock().find(hash, key).is_some()
    }

    /// Maps `key` to `value` and returns the previous value.
    ///
    /// Both overwrites and inserts count one visit. Inserting a new key
    /// beyond `max_size` evicts one entry if a victim can be found.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let hash = self.hash(&key);
        let mut inner = self.inner.lock();

        if let Some(idx) = inner.find(hash, &key) {
            inner.touch(idx, self.victim_size);
            inner.metrics.core.record_update();
            return Some(core::mem::replace(&mut inner.nodes[idx].item.value, value));
        }

        let now = inner.add_visit(self.victim_size);
        let entry = LruEntry {
            key,
            value,
            hash,
            map_prev: NIL,
            map_next: NIL,
        };
        let idx = inner.nodes.insert(LruNode::new(entry, now));
        inner.link_map(idx);
        let Inner { nodes, list, .. } = &mut *inner;
        list.add_entry(nodes, idx);
        inner.metrics.core.record_insertion();

        if self.size.fetch_add(1, Ordering::AcqRel) >= self.max_size {
            self.evict(&mut inner);
        }
        None
    }

    fn evict(&self, inner: &mut Inner<K, V>) {
        let Inner { nodes, list, .. } = inner;
        match list.find_victim(nodes, self.victim_size) {
            Some(victim) => {
                inner.unlink_map(victim);
                inner.nodes.remove(victim);
                inner.metrics.core.record_eviction();
                self.size.fetch_sub(1, Ordering::AcqRel);
            }
            None => {
                inner.metrics.victim_misses += 1;
                log::debug!(
                    "no eviction victim found, cache holds {} of {} entries",
                    self.size.load(Ordering::Relaxed),
                    self.max_size
                );
            }
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash(key);
        let mut inner = self.inner.lock();
        let idx = inner.find(hash, key)?;

        inner.unlink_map(idx);
        let Inner { nodes, list, .. } = &mut *inner;
        list.remove_entry(nodes, idx);
        let node = inner.nodes.remove(idx)?;
        inner.metrics.core.record_removal();
        self.size.fetch_sub(1, Ordering::AcqRel);
        Some(node.item.value)
    }

    /// Removes every entry. Metrics and the clock are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.clear();
        self.size.store(0, Ordering::Release);
    }

    /// Snapshot of the cache's counters.
    pub fn three_q_metrics(&self) -> ThreeQMetrics {
        let inner = self.inner.lock();
        let mut metrics = inner.metrics.clone();
        metrics.header_pushes = inner.list.header_pushes();
        metrics.entries_scanned = inner.list.scanned();
        metrics
    }
}

impl<K, V, S> Cache<K, V> for ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn size(&self) -> usize {
        ConcurrentLruCache::size(self)
    }

    fn get(&mut self, key: &K) -> Option<V> {
        ConcurrentLruCache::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        ConcurrentLruCache::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ConcurrentLruCache::remove(self, key)
    }
}

impl<K, V, S> CacheMetrics for ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.three_q_metrics().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "3Q-LRU"
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentLruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("max_size", &self.max_size)
            .field("size", &self.size.load(Ordering::Relaxed))
            .field("victim_size", &self.victim_size)
            .field("buckets", &inner.table.len())
            .field("list", &inner.list)
            .finish()
    }
}
