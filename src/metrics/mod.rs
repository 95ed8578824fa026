//! Cache Metrics System
//!
//! Each cache keeps plain counters next to its data, updated under the same
//! lock as the data itself, and reports them through the [`CacheMetrics`]
//! trait as a `BTreeMap<String, f64>`.
//!
//! # Why BTreeMap over HashMap?
//!
//! BTreeMap keeps the keys sorted, so two snapshots of the same cache always
//! print in the same order. That makes benchmark comparisons and test
//! assertions reproducible; with about a dozen keys the lookup cost does not
//! matter.

use std::collections::BTreeMap;

pub mod lfu;
pub mod lru;
pub mod three_q;

pub use lfu::SegmentLfuMetrics;
pub use lru::LruHashMapMetrics;
pub use three_q::ThreeQMetrics;

/// Counters tracked by every cache in this crate.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of lookups.
    pub requests: u64,

    /// Lookups that found their key.
    pub cache_hits: u64,

    /// Puts that created a new entry.
    pub insertions: u64,

    /// Puts that replaced the value of an existing entry.
    pub updates: u64,

    /// Entries removed by an explicit `remove`.
    pub removals: u64,

    /// Entries removed by the eviction policy.
    pub evictions: u64,
}

impl CoreCacheMetrics {
    /// Creates an all-zero set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key.
    #[inline]
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key.
    #[inline]
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a put of a new key.
    #[inline]
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a put that overwrote an existing key.
    #[inline]
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records an explicit removal.
    #[inline]
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Records an eviction.
    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Number of lookups that missed.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Fraction of lookups that hit, or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, or 0.0 before the first lookup.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Adds the counters of `other` to `self`.
    ///
    /// Used by sharded caches to build one snapshot out of per-shard counters.
    pub fn merge(&mut self, other: &CoreCacheMetrics) {
        self.requests += other.requests;
        self.cache_hits += other.cache_hits;
        self.insertions += other.insertions;
        self.updates += other.updates;
        self.removals += other.removals;
        self.evictions += other.evictions;
    }

    /// Converts the counters and derived rates to a sorted map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform access to the metrics of any cache in this crate.
///
/// Keys are sorted alphabetically so snapshots compare and print
/// deterministically.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// A short static name identifying the eviction algorithm.
    fn algorithm_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_metrics_rates() {
        let mut m = CoreCacheMetrics::new();
        assert_eq!(m.hit_rate(), 0.0);
        assert_eq!(m.miss_rate(), 0.0);

        m.record_hit();
        m.record_hit();
        m.record_hit();
        m.record_miss();
        assert_eq!(m.requests, 4);
        assert_eq!(m.cache_misses(), 1);
        assert!((m.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert!((m.miss_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_core_metrics_merge_and_map() {
        let mut a = CoreCacheMetrics::new();
        a.record_insertion();
        a.record_eviction();
        let mut b = CoreCacheMetrics::new();
        b.record_insertion();
        b.record_update();
        b.record_removal();
        b.record_miss();

        a.merge(&b);
        assert_eq!(a.insertions, 2);
        assert_eq!(a.updates, 1);
        assert_eq!(a.removals, 1);
        assert_eq!(a.evictions, 1);

        let map = a.to_btreemap();
        assert_eq!(map.get("insertions"), Some(&2.0));
        assert_eq!(map.get("cache_misses"), Some(&1.0));
        assert_eq!(map.get("eviction_rate"), Some(&1.0));
        let keys: Vec<&String> = map.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
