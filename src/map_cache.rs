//! Maps as caches.
//!
//! [`MapAsCache`] turns any map implementing [`BackingMap`] into a
//! [`Cache`]. Wrapping a plain `HashMap` gives an unbounded cache; wrapping an
//! [`LruHashMap`] gives an exact-LRU one. [`SyncMapCache`] does the same
//! behind a mutex so the map can be shared between threads, which makes it
//! the lock-everything baseline for the concurrent caches.
//!
//! ```
//! use segcache::{Cache, MapAsCache, SyncMapCache, LruHashMap};
//! use std::collections::HashMap;
//! use std::num::NonZeroUsize;
//!
//! let mut cache = MapAsCache::new(HashMap::new());
//! cache.put("a", 1);
//! assert_eq!(cache.get(&"a"), Some(1));
//!
//! let shared = SyncMapCache::new(LruHashMap::new(NonZeroUsize::new(2).unwrap()));
//! shared.put("a", 1);
//! shared.put("b", 2);
//! shared.put("c", 3);
//! assert_eq!(shared.size(), 2);
//! assert_eq!(shared.get(&"a"), None);
//! ```

use crate::cache::Cache;
use crate::lru_map::LruHashMap;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// The map operations a cache needs.
///
/// `map_get` takes `&mut self` so access-ordered maps can record the read.
pub trait BackingMap<K, V> {
    /// Number of entries.
    fn map_len(&self) -> usize;

    /// Returns a clone of the value for `key`.
    fn map_get(&mut self, key: &K) -> Option<V>;

    /// Inserts `key` and returns the previous value.
    fn map_insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key` and returns its value.
    fn map_remove(&mut self, key: &K) -> Option<V>;
}

impl<K, V, S> BackingMap<K, V> for std::collections::HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn map_len(&self) -> usize {
        self.len()
    }

    fn map_get(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn map_insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn map_remove(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

impl<K, V, S> BackingMap<K, V> for hashbrown::HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn map_len(&self) -> usize {
        self.len()
    }

    fn map_get(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn map_insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn map_remove(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

impl<K: Ord, V: Clone> BackingMap<K, V> for BTreeMap<K, V> {
    fn map_len(&self) -> usize {
        self.len()
    }

    fn map_get(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn map_insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn map_remove(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

impl<K, V, S> BackingMap<K, V> for LruHashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn map_len(&self) -> usize {
        self.len()
    }

    fn map_get(&mut self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn map_insert(&mut self, key: K, value: V) -> Option<V> {
        self.put(key, value)
    }

    fn map_remove(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

/// A [`Cache`] backed by a map. Not thread-safe.
#[derive(Debug, Clone, Default)]
pub struct MapAsCache<M> {
    map: M,
}

impl<M> MapAsCache<M> {
    /// Wraps `map`.
    pub fn new(map: M) -> Self {
        Self { map }
    }

    /// The wrapped map.
    pub fn get_ref(&self) -> &M {
        &self.map
    }

    /// Unwraps the map.
    pub fn into_inner(self) -> M {
        self.map
    }
}

impl<K, V, M: BackingMap<K, V>> Cache<K, V> for MapAsCache<M> {
    fn size(&self) -> usize {
        self.map.map_len()
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.map.map_get(key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.map.map_insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.map.map_remove(key)
    }
}

/// A thread-safe [`Cache`] backed by a map behind one mutex.
#[derive(Debug, Default)]
pub struct SyncMapCache<M> {
    map: Mutex<M>,
}

impl<M> SyncMapCache<M> {
    /// Wraps `map`.
    pub fn new(map: M) -> Self {
        Self {
            map: Mutex::new(map),
        }
    }

    /// Unwraps the map.
    pub fn into_inner(self) -> M {
        self.map.into_inner()
    }

    /// Number of entries.
    pub fn size<K, V>(&self) -> usize
    where
        M: BackingMap<K, V>,
    {
        self.map.lock().map_len()
    }

    /// Returns a clone of the value for `key`.
    pub fn get<K, V>(&self, key: &K) -> Option<V>
    where
        M: BackingMap<K, V>,
    {
        self.map.lock().map_get(key)
    }

    /// Maps `key` to `value` and returns the previous value.
    pub fn put<K, V>(&self, key: K, value: V) -> Option<V>
    where
        M: BackingMap<K, V>,
    {
        self.map.lock().map_insert(key, value)
    }

    /// Removes `key` and returns its value.
    pub fn remove<K, V>(&self, key: &K) -> Option<V>
    where
        M: BackingMap<K, V>,
    {
        self.map.lock().map_remove(key)
    }
}

impl<K, V, M: BackingMap<K, V>> Cache<K, V> for SyncMapCache<M> {
    fn size(&self) -> usize {
        self.map.lock().map_len()
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.map.get_mut().map_get(key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.map.get_mut().map_insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.map.get_mut().map_remove(key)
    }
}
