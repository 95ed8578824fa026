//! Correctness Tests for the Caches
//!
//! Single-threaded checks of the cache contract and of each eviction policy,
//! using deterministic key sets.
//!
//! ## Test Strategy
//! - The same contract checks run against every `Cache` implementation
//! - Eviction tests fill a cache to capacity and check which keys survive
//! - Sizes follow the smallest geometry each cache accepts

use segcache::config::{ConcurrentLruCacheConfig, LruHashMapConfig, SegmentLfuCacheConfig};
use segcache::{
    Cache, CacheError, CacheMetrics, ConcurrentLruCache, LruHashMap, MapAsCache,
    SegmentLfuCache, SyncMapCache,
};
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;

// ============================================================================
// HELPER FUNCTIONS FOR CACHE CREATION
// ============================================================================

fn make_lfu<V: Clone>(max_size: usize) -> SegmentLfuCache<String, V> {
    SegmentLfuCache::from_config(SegmentLfuCacheConfig::new(max_size)).unwrap()
}

fn make_lru<V: Clone>(max_size: usize) -> ConcurrentLruCache<String, V> {
    ConcurrentLruCache::from_config(ConcurrentLruCacheConfig::new(max_size)).unwrap()
}

fn make_lru_map<V>(cap: usize) -> LruHashMap<String, V> {
    LruHashMap::from_config(LruHashMapConfig::new(NonZeroUsize::new(cap).unwrap()))
}

/// Checks the four contract operations on an empty cache with room for at
/// least three entries.
fn check_contract<C: Cache<String, i32>>(cache: &mut C) {
    assert_eq!(cache.size(), 0);
    assert_eq!(cache.get(&"missing".to_string()), None);

    assert_eq!(cache.put("nice".to_string(), 7788), None);
    assert_eq!(cache.get(&"nice".to_string()), Some(7788));
    assert_eq!(cache.size(), 1);

    assert_eq!(cache.put("nice".to_string(), 6688), Some(7788));
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.put("nlce".to_string(), 7788), None);
    assert_eq!(cache.size(), 2);

    assert_eq!(cache.remove(&"nice".to_string()), Some(6688));
    assert_eq!(cache.get(&"nice".to_string()), None);
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.remove(&"nice".to_string()), None);
    assert_eq!(cache.size(), 1);
}

// ============================================================================
// CACHE CONTRACT
// ============================================================================

#[test]
fn test_contract_segment_lfu() {
    check_contract(&mut make_lfu(2048));
}

#[test]
fn test_contract_concurrent_lru() {
    check_contract(&mut make_lru(100));
}

#[test]
fn test_contract_lru_map() {
    check_contract(&mut make_lru_map(10));
}

#[test]
fn test_contract_map_adapters() {
    check_contract(&mut MapAsCache::new(HashMap::new()));
    check_contract(&mut MapAsCache::new(BTreeMap::new()));
    check_contract(&mut MapAsCache::new(make_lru_map(10)));
    check_contract(&mut SyncMapCache::new(HashMap::new()));
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_segment_lfu_rejects_small_size() {
    let err = SegmentLfuCache::<String, i32>::new(1000, 16).unwrap_err();
    assert_eq!(
        err,
        CacheError::CapacityTooSmall {
            requested: 1000,
            minimum: 2048,
        }
    );
    assert!(err.to_string().contains("too small"));
}

#[test]
fn test_segment_lfu_segment_count() {
    let cache: SegmentLfuCache<u32, u32> = SegmentLfuCache::from_config(
        SegmentLfuCacheConfig::new(1 << 16).with_concurrency(33),
    )
    .unwrap();
    assert_eq!(cache.segment_count(), 64);
    assert_eq!(cache.max_size(), 1 << 16);

    let cache: SegmentLfuCache<u32, u32> = SegmentLfuCache::new(1 << 16, 1).unwrap();
    assert_eq!(cache.segment_count(), 16);
}

#[test]
fn test_concurrent_lru_rejects_small_size() {
    assert!(matches!(
        ConcurrentLruCache::<String, i32>::new(50),
        Err(CacheError::CapacityTooSmall { minimum: 50, .. })
    ));
    assert!(ConcurrentLruCache::<String, i32>::new(51).is_ok());
}

// ============================================================================
// SEGMENTED LFU
// ============================================================================

#[test]
fn test_segment_lfu_fill_then_one_more() {
    let cache = make_lfu(2048);
    for i in 0..2048 {
        cache.put(format!("nice{i}"), i);
    }
    assert_eq!(cache.size(), 2048);
    for i in 0..2048 {
        assert_eq!(cache.get(&format!("nice{i}")), Some(i));
    }

    cache.put("nice2048".to_string(), 2048);
    assert_eq!(cache.size(), 2048);
    let missing = (0..=2048)
        .filter(|i| !cache.contains_key(&format!("nice{i}")))
        .count();
    assert_eq!(missing, 1);
}

#[test]
fn test_segment_lfu_frequent_keys_survive() {
    let cache = make_lfu(2048);
    for i in 0..2048 {
        cache.put(format!("k{i}"), i);
    }
    for _ in 0..20 {
        for i in 0..100 {
            assert_eq!(cache.get(&format!("k{i}")), Some(i));
        }
    }
    for i in 0..2048 {
        cache.put(format!("new{i}"), i);
        assert!(cache.size() <= 2048);
    }

    let hot_kept = (0..100)
        .filter(|i| cache.contains_key(&format!("k{i}")))
        .count();
    let cold_kept = (100..2048)
        .filter(|i| cache.contains_key(&format!("k{i}")))
        .count();
    assert!(hot_kept >= 95, "only {hot_kept} of 100 hot keys kept");
    assert!(cold_kept < 1948 / 2, "{cold_kept} cold keys kept");
}

#[test]
fn test_segment_lfu_overwrite_keeps_size() {
    let cache = make_lfu(2048);
    for round in 0..3 {
        for i in 0..500 {
            cache.put(format!("k{i}"), i + round);
        }
    }
    assert_eq!(cache.size(), 500);
    assert_eq!(cache.get("k499"), Some(501));
    let metrics = cache.metrics();
    assert_eq!(metrics.get("insertions"), Some(&500.0));
    assert_eq!(metrics.get("updates"), Some(&1000.0));
    assert_eq!(metrics.get("evictions"), Some(&0.0));
}

#[test]
fn test_segment_lfu_remove_frees_room() {
    let cache = make_lfu(2048);
    for i in 0..2048 {
        cache.put(format!("k{i}"), i);
    }
    for i in 0..10 {
        assert_eq!(cache.remove(&format!("k{i}")), Some(i));
    }
    assert_eq!(cache.size(), 2038);
    for i in 0..10 {
        cache.put(format!("r{i}"), i);
    }
    assert_eq!(cache.size(), 2048);
    assert_eq!(cache.segment_metrics().core.evictions, 0);
}

// ============================================================================
// 3Q LRU
// ============================================================================

#[test]
fn test_concurrent_lru_demo() {
    let cache = make_lru(100);
    cache.put("demo".to_string(), 33);
    assert_eq!(cache.size(), 1);
    assert_eq!(cache.remove("demo"), Some(33));
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_concurrent_lru_recent_key_survives() {
    let cache = make_lru(100);
    for i in 0..100 {
        cache.put(format!("k{i}"), i);
    }
    assert_eq!(cache.get("k0"), Some(0));
    cache.put("k100".to_string(), 100);

    assert_eq!(cache.size(), 100);
    assert!(cache.contains_key("k0"));
    assert!(!cache.contains_key("k1"));
}

#[test]
fn test_concurrent_lru_sequential_scan_evicts_oldest() {
    let cache = make_lru(100);
    for i in 0..1000 {
        cache.put(format!("k{i}"), i);
        assert!(cache.size() <= 100);
    }
    // The newest keys are still there.
    for i in 960..1000 {
        assert_eq!(cache.get(&format!("k{i}")), Some(i));
    }
    assert!(!cache.contains_key("k0"));
    assert_eq!(cache.three_q_metrics().core.evictions, 900);
}

// ============================================================================
// LRU MAP
// ============================================================================

#[test]
fn test_lru_map_evicts_least_recent() {
    let mut map = make_lru_map(3);
    map.put("a".to_string(), 1);
    map.put("b".to_string(), 2);
    map.put("c".to_string(), 3);
    map.get("a");
    map.put("d".to_string(), 4);

    assert!(map.contains_key("a"));
    assert!(!map.contains_key("b"));
    assert_eq!(map.peek_lru(), Some((&"c".to_string(), &3)));
    assert_eq!(map.len(), 3);
    assert_eq!(map.cap().get(), 3);
}

#[test]
fn test_metrics_names() {
    assert_eq!(make_lfu::<i32>(2048).algorithm_name(), "SegmentLFU");
    assert_eq!(make_lru::<i32>(100).algorithm_name(), "3Q-LRU");
    assert_eq!(make_lru_map::<i32>(1).algorithm_name(), "LRU");
}
