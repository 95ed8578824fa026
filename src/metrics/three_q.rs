//! 3Q LRU Cache Metrics
//!
//! Metrics specific to [`ConcurrentLruCache`](crate::ConcurrentLruCache) and
//! its three-round victim search.

use super::{CacheMetrics, CoreCacheMetrics};
use std::collections::BTreeMap;

/// 3Q-specific metrics (extends [`CoreCacheMetrics`]).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ThreeQMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Victim searches that found no entry old enough, leaving the cache
    /// temporarily above its maximum size.
    pub victim_misses: u64,

    /// Times the round-header timestamps were rolled forward.
    pub header_pushes: u64,

    /// Entries walked by victim searches.
    pub entries_scanned: u64,
}

impl ThreeQMetrics {
    /// Creates an all-zero set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the metrics to a sorted map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert("victim_misses".to_string(), self.victim_misses as f64);
        metrics.insert("header_pushes".to_string(), self.header_pushes as f64);
        metrics.insert("entries_scanned".to_string(), self.entries_scanned as f64);
        metrics
    }
}

impl CacheMetrics for ThreeQMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "3Q-LRU"
    }
}
