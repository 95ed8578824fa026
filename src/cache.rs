//! The cache contract shared by every cache in this crate.

/// A bounded in-memory key-value cache.
///
/// This is deliberately smaller than a map interface: a cache only promises
/// that a value it still holds is returned by `get`, and that `size` reports
/// the number of entries it holds right now. Entries may disappear at any
/// time through eviction.
///
/// The methods take `&mut self` so single-threaded caches can implement the
/// trait without interior mutability. The concurrent caches implement it by
/// forwarding to inherent `&self` methods of the same name, which are the
/// ones to use when the cache is shared through an `Arc`.
///
/// # Examples
///
/// ```
/// use segcache::{Cache, LruHashMap};
/// use std::num::NonZeroUsize;
///
/// fn warm<C: Cache<u32, String>>(cache: &mut C) {
///     for i in 0..4 {
///         cache.put(i, i.to_string());
///     }
/// }
///
/// let mut cache = LruHashMap::new(NonZeroUsize::new(2).unwrap());
/// warm(&mut cache);
/// assert_eq!(Cache::size(&cache), 2);
/// assert_eq!(Cache::get(&mut cache, &3), Some("3".to_string()));
/// ```
pub trait Cache<K, V> {
    /// Returns the number of entries currently held.
    fn size(&self) -> usize;

    /// Returns a copy of the value mapped to `key`, or `None` if the cache
    /// does not hold it. Counts as an access for the eviction policy.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Maps `key` to `value`, replacing any previous value, and returns the
    /// previous value. May evict other entries.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Removes the mapping for `key` and returns its value. The cache does
    /// not contain `key` once this returns.
    fn remove(&mut self, key: &K) -> Option<V>;
}
