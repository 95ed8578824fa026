//! Access-ordered LRU Map
//!
//! A bounded map that keeps its entries in access order and drops the least
//! recently used one when a new key would exceed its capacity. It is the
//! exact-LRU baseline the approximate caches are measured against.
//!
//! # Performance Characteristics
//!
//! - Get, put, remove: O(1)
//! - One hash map slot plus one list node per entry; the key is stored twice
//!
//! # Thread Safety
//!
//! Not thread-safe. Every method that touches recency takes `&mut self`;
//! wrap the map in a `Mutex` to share it.
//!
//! # Example
//!
//! ```rust
//! use segcache::LruHashMap;
//! use std::num::NonZeroUsize;
//!
//! let mut map = LruHashMap::new(NonZeroUsize::new(2).unwrap());
//! map.put("apple", 1);
//! map.put("banana", 2);
//! assert_eq!(map.get(&"apple"), Some(&1));
//!
//! // "banana" is now the least recently used.
//! map.put("cherry", 3);
//! assert!(!map.contains_key(&"banana"));
//! assert_eq!(map.len(), 2);
//! ```

use crate::cache::Cache;
use crate::config::LruHashMapConfig;
use crate::list::List;
use crate::metrics::{CacheMetrics, LruHashMapMetrics};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use hashbrown::DefaultHashBuilder;
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// A bounded map with least-recently-used eviction.
pub struct LruHashMap<K, V, S = DefaultHashBuilder> {
    list: List<(K, V)>,
    map: HashMap<K, usize, S>,
    metrics: LruHashMapMetrics,
}

impl<K: Hash + Eq, V> LruHashMap<K, V> {
    /// Creates a map holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> LruHashMap<K, V, DefaultHashBuilder> {
        LruHashMap::with_hasher(cap, DefaultHashBuilder::default())
    }

    /// Creates a map from a [`LruHashMapConfig`].
    pub fn from_config(config: LruHashMapConfig) -> LruHashMap<K, V, DefaultHashBuilder> {
        LruHashMap::new(config.capacity())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruHashMap<K, V, S> {
    /// Creates a map holding at most `cap` entries that hashes keys with
    /// `hash_builder`.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        let map_capacity = cap.get().next_power_of_two();
        LruHashMap {
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
            metrics: LruHashMapMetrics::new(),
        }
    }

    /// Maximum number of entries.
    pub fn cap(&self) -> NonZeroUsize {
        self.list.cap()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns a reference to the value of `key` and marks it most recently
    /// used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get(key).copied() {
            Some(node) => {
                self.list.move_to_front(node);
                self.metrics.core.record_hit();
                self.list.get_value(node).map(|(_, v)| v)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Like [`get`](Self::get), returning a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get(key).copied() {
            Some(node) => {
                self.list.move_to_front(node);
                self.metrics.core.record_hit();
                self.list.get_value_mut(node).map(|(_, v)| v)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Returns a reference to the value of `key` without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = *self.map.get(key)?;
        self.list.get_value(node).map(|(_, v)| v)
    }

    /// The least recently used entry, which the next insert would evict.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|(k, v)| (k, v))
    }

    /// Returns `true` if the map holds `key`. Does not touch recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        self.metrics.core.record_removal();
        self.list.remove(node).map(|(_, v)| v)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.remove_last()?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Removes every entry. Metrics are kept.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.list.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruHashMap<K, V, S> {
    /// Maps `key` to `value` and marks it most recently used.
    ///
    /// Returns the previous value of `key`. Inserting a new key into a full
    /// map first evicts the least recently used entry.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&node) = self.map.get(&key) {
            self.list.move_to_front(node);
            self.metrics.core.record_update();
            return self.list.update(node, (key, value)).map(|(_, v)| v);
        }

        if self.list.is_full() && self.pop_lru().is_some() {
            self.metrics.core.record_eviction();
        }
        if let Some(node) = self.list.add((key.clone(), value)) {
            self.map.insert(key, node);
            self.metrics.core.record_insertion();
        }
        None
    }
}

impl<K, V, S> Cache<K, V> for LruHashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn size(&self) -> usize {
        self.len()
    }

    fn get(&mut self, key: &K) -> Option<V> {
        LruHashMap::get(self, key).cloned()
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        LruHashMap::put(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        LruHashMap::remove(self, key)
    }
}

impl<K, V, S> CacheMetrics for LruHashMap<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

impl<K, V, S> fmt::Debug for LruHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruHashMap")
            .field("capacity", &self.list.cap())
            .field("len", &self.list.len())
            .finish()
    }
}
