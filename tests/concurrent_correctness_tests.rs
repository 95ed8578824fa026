//! Correctness Tests for the Concurrent Caches
//!
//! Checks that the eviction policies and the size bounds of
//! `SegmentLfuCache` and `ConcurrentLruCache` hold when several threads use
//! one cache at the same time.

use segcache::{ConcurrentLruCache, SegmentLfuCache};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;

// ============================================================================
// SEGMENTED LFU
// ============================================================================

#[test]
fn test_segment_lfu_disjoint_writers_exact_size() {
    let cache: Arc<SegmentLfuCache<usize, usize>> =
        Arc::new(SegmentLfuCache::new(100_000, 32).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..2000 {
                    assert_eq!(cache.put(t * 2000 + i, i), None);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("Thread panicked");
    }

    assert_eq!(cache.size(), THREADS * 2000);
    for key in 0..THREADS * 2000 {
        assert_eq!(cache.get(&key), Some(key % 2000));
    }
}

#[test]
fn test_segment_lfu_capacity_never_exceeded() {
    let cache: Arc<SegmentLfuCache<usize, usize>> =
        Arc::new(SegmentLfuCache::new(4096, 16).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..10_000 {
                    cache.put(t * 100_000 + i, i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("Thread panicked");
    }

    assert_eq!(cache.size(), 4096);
    let metrics = cache.segment_metrics();
    assert_eq!(metrics.core.insertions, (THREADS * 10_000) as u64);
    assert_eq!(
        metrics.core.insertions - metrics.core.evictions,
        cache.size() as u64
    );
}

#[test]
fn test_segment_lfu_hot_keys_survive_concurrent_churn() {
    let cache: Arc<SegmentLfuCache<String, usize>> =
        Arc::new(SegmentLfuCache::new(2048, 16).unwrap());
    for i in 0..100 {
        cache.put(format!("hot{i}"), i);
    }
    for _ in 0..30 {
        for i in 0..100 {
            cache.get(&format!("hot{i}"));
        }
    }

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..1500 {
                    cache.put(format!("cold{t}-{i}"), i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("Thread panicked");
    }

    assert_eq!(cache.size(), 2048);
    let hot_kept = (0..100)
        .filter(|i| cache.contains_key(&format!("hot{i}")))
        .count();
    assert!(hot_kept >= 95, "only {hot_kept} of 100 hot keys kept");
}

#[test]
fn test_segment_lfu_remove_consistency() {
    let cache: Arc<SegmentLfuCache<usize, usize>> =
        Arc::new(SegmentLfuCache::new(100_000, 16).unwrap());
    for i in 0..8000 {
        cache.put(i, i);
    }

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut removed = 0;
                for i in (t..8000).step_by(4) {
                    if cache.remove(&i) == Some(i) {
                        removed += 1;
                    }
                }
                removed
            })
        })
        .collect();
    let removed: usize = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .sum();

    assert_eq!(removed, 8000);
    assert!(cache.is_empty());
}

// ============================================================================
// 3Q LRU
// ============================================================================

#[test]
fn test_concurrent_lru_size_bounded() {
    let cache: Arc<ConcurrentLruCache<usize, usize>> =
        Arc::new(ConcurrentLruCache::new(1000).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..5000 {
                    cache.put(t * 100_000 + i, i);
                    cache.get(&(t * 100_000 + i / 2));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("Thread panicked");
    }

    let metrics = cache.three_q_metrics();
    assert_eq!(metrics.victim_misses, 0);
    assert!(cache.size() <= cache.max_size());
    assert_eq!(
        metrics.core.insertions - metrics.core.evictions,
        cache.size() as u64
    );
}

#[test]
fn test_concurrent_lru_update_last_writer_wins() {
    let cache: Arc<ConcurrentLruCache<&'static str, usize>> =
        Arc::new(ConcurrentLruCache::new(100).unwrap());
    cache.put("shared", 0);

    let handles: Vec<_> = (1..=THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let old = cache.put("shared", t);
                    assert!(old.is_some());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("Thread panicked");
    }

    assert_eq!(cache.size(), 1);
    let value = cache.get(&"shared").unwrap();
    assert!((1..=THREADS).contains(&value));
}

#[test]
fn test_concurrent_lru_readers_keep_keys_alive() {
    let cache: Arc<ConcurrentLruCache<usize, usize>> =
        Arc::new(ConcurrentLruCache::new(200).unwrap());
    for i in 0..10 {
        cache.put(i, i);
    }

    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for _ in 0..2000 {
                for i in 0..10 {
                    cache.get(&i);
                }
            }
        })
    };
    reader.join().expect("Thread panicked");

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..150 {
                cache.put(1000 + i, i);
            }
        })
    };
    writer.join().expect("Thread panicked");

    for i in 0..10 {
        assert_eq!(cache.get(&i), Some(i));
    }
}
