//! Segmented LFU Cache Metrics
//!
//! Metrics specific to the clock-swept LFU eviction of
//! [`SegmentLfuCache`](crate::SegmentLfuCache).

use super::{CacheMetrics, CoreCacheMetrics};
use std::collections::BTreeMap;

/// Clock-LFU metrics (extends [`CoreCacheMetrics`]).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SegmentLfuMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Number of eviction sweeps started on a non-empty segment.
    pub eviction_sweeps: u64,

    /// Entries whose visit counter was consumed by a sweep.
    pub entries_scanned: u64,

    /// Sweeps that ran out of budget before finding a victim.
    pub batch_exhausted: u64,
}

impl SegmentLfuMetrics {
    /// Creates an all-zero set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the counters of another segment.
    pub fn merge(&mut self, other: &SegmentLfuMetrics) {
        self.core.merge(&other.core);
        self.eviction_sweeps += other.eviction_sweeps;
        self.entries_scanned += other.entries_scanned;
        self.batch_exhausted += other.batch_exhausted;
    }

    /// Average number of entries a sweep touched, or 0.0 before any sweep.
    pub fn avg_sweep_length(&self) -> f64 {
        if self.eviction_sweeps > 0 {
            self.entries_scanned as f64 / self.eviction_sweeps as f64
        } else {
            0.0
        }
    }

    /// Converts the metrics to a sorted map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert("eviction_sweeps".to_string(), self.eviction_sweeps as f64);
        metrics.insert("entries_scanned".to_string(), self.entries_scanned as f64);
        metrics.insert("batch_exhausted".to_string(), self.batch_exhausted as f64);
        metrics.insert("avg_sweep_length".to_string(), self.avg_sweep_length());
        metrics
    }
}

impl CacheMetrics for SegmentLfuMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "SegmentLFU"
    }
}
