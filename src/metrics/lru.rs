//! LRU Map Metrics
//!
//! Metrics for the [`LruHashMap`](crate::LruHashMap) baseline.

use super::{CacheMetrics, CoreCacheMetrics};
use std::collections::BTreeMap;

/// LRU map metrics. Strict LRU has nothing to report beyond the core
/// counters, but the wrapper keeps the same shape as the other caches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LruHashMapMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,
}

impl LruHashMapMetrics {
    /// Creates an all-zero set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the metrics to a sorted map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        self.core.to_btreemap()
    }
}

impl CacheMetrics for LruHashMapMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
