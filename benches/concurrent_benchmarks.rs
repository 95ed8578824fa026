//! Concurrent Cache Benchmarks
//!
//! Benchmarks for measuring concurrent cache performance across different
//! access patterns and segment configurations. The mutex-wrapped LRU map is
//! the lock-everything baseline.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use segcache::config::{ConcurrentLruCacheConfig, SegmentLfuCacheConfig};
use segcache::{ConcurrentLruCache, LruHashMap, SegmentLfuCache, SyncMapCache};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

const CACHE_SIZE: usize = 10_000;
const OPS_PER_THREAD: usize = 1_000;
const THREADS: usize = 8;

// Helper trait for generic cache operations
trait ConcurrentCache<K, V>: Send + Sync {
    fn cache_get(&self, key: &K) -> Option<V>;
    fn cache_put(&self, key: K, value: V);
}

impl ConcurrentCache<usize, usize> for SegmentLfuCache<usize, usize> {
    fn cache_get(&self, key: &usize) -> Option<usize> {
        self.get(key)
    }
    fn cache_put(&self, key: usize, value: usize) {
        self.put(key, value);
    }
}

impl ConcurrentCache<usize, usize> for ConcurrentLruCache<usize, usize> {
    fn cache_get(&self, key: &usize) -> Option<usize> {
        self.get(key)
    }
    fn cache_put(&self, key: usize, value: usize) {
        self.put(key, value);
    }
}

impl ConcurrentCache<usize, usize> for SyncMapCache<LruHashMap<usize, usize>> {
    fn cache_get(&self, key: &usize) -> Option<usize> {
        self.get(key)
    }
    fn cache_put(&self, key: usize, value: usize) {
        self.put(key, value);
    }
}

fn lfu(concurrency: usize) -> Arc<SegmentLfuCache<usize, usize>> {
    Arc::new(
        SegmentLfuCache::from_config(
            SegmentLfuCacheConfig::new(CACHE_SIZE).with_concurrency(concurrency),
        )
        .unwrap(),
    )
}

fn lru() -> Arc<ConcurrentLruCache<usize, usize>> {
    Arc::new(ConcurrentLruCache::from_config(ConcurrentLruCacheConfig::new(CACHE_SIZE)).unwrap())
}

fn locked_map() -> Arc<SyncMapCache<LruHashMap<usize, usize>>> {
    Arc::new(SyncMapCache::new(LruHashMap::new(
        NonZeroUsize::new(CACHE_SIZE).unwrap(),
    )))
}

fn prefill<C: ConcurrentCache<usize, usize>>(cache: &C) {
    for i in 0..CACHE_SIZE {
        cache.cache_put(i, i);
    }
}

/// Benchmark concurrent read operations across all cache types
fn concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Reads");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    let lfu_cache = lfu(16);
    let lru_cache = lru();
    let map_cache = locked_map();
    prefill(&*lfu_cache);
    prefill(&*lru_cache);
    prefill(&*map_cache);

    group.bench_function("SegmentLFU", |b| {
        b.iter(|| run_concurrent_reads(Arc::clone(&lfu_cache), THREADS, OPS_PER_THREAD));
    });
    group.bench_function("3Q-LRU", |b| {
        b.iter(|| run_concurrent_reads(Arc::clone(&lru_cache), THREADS, OPS_PER_THREAD));
    });
    group.bench_function("Mutex<LRU map>", |b| {
        b.iter(|| run_concurrent_reads(Arc::clone(&map_cache), THREADS, OPS_PER_THREAD));
    });

    group.finish();
}

/// Benchmark concurrent write operations across all cache types
fn concurrent_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Writes");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    group.bench_function("SegmentLFU", |b| {
        let cache = lfu(16);
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });
    group.bench_function("3Q-LRU", |b| {
        let cache = lru();
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });
    group.bench_function("Mutex<LRU map>", |b| {
        let cache = locked_map();
        b.iter(|| run_concurrent_writes(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });

    group.finish();
}

/// Benchmark mixed read/write operations (80% reads, 20% writes)
fn concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed (80/20)");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    group.bench_function("SegmentLFU", |b| {
        let cache = lfu(16);
        prefill(&*cache);
        b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });
    group.bench_function("3Q-LRU", |b| {
        let cache = lru();
        prefill(&*cache);
        b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });
    group.bench_function("Mutex<LRU map>", |b| {
        let cache = locked_map();
        prefill(&*cache);
        b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
    });

    group.finish();
}

fn segment_count_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Segment Count Comparison (SegmentLFU)");
    group.throughput(Throughput::Elements((THREADS * OPS_PER_THREAD) as u64));

    // 10_000 entries leave at least 128 slots per segment up to 64 segments.
    for concurrency in [16, 32, 64] {
        group.bench_with_input(
            BenchmarkId::new("segments", concurrency),
            &concurrency,
            |b, &concurrency| {
                let cache = lfu(concurrency);
                prefill(&*cache);
                b.iter(|| run_concurrent_mixed(Arc::clone(&cache), THREADS, OPS_PER_THREAD));
            },
        );
    }

    group.finish();
}

// Generic concurrent read runner
fn run_concurrent_reads<C>(cache: Arc<C>, num_threads: usize, ops_per_thread: usize)
where
    C: ConcurrentCache<usize, usize> + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) % CACHE_SIZE;
                black_box(cache.cache_get(&key));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

// Generic concurrent write runner; keys past CACHE_SIZE force evictions
fn run_concurrent_writes<C>(cache: Arc<C>, num_threads: usize, ops_per_thread: usize)
where
    C: ConcurrentCache<usize, usize> + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) * 3;
                cache.cache_put(key, key);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

// Generic concurrent mixed runner (80% reads, 20% writes)
fn run_concurrent_mixed<C>(cache: Arc<C>, num_threads: usize, ops_per_thread: usize)
where
    C: ConcurrentCache<usize, usize> + 'static,
{
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..ops_per_thread {
                let key = (t * ops_per_thread + i) % (CACHE_SIZE * 2);
                if i % 5 == 0 {
                    cache.cache_put(key, key);
                } else {
                    black_box(cache.cache_get(&key));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

criterion_group!(
    benches,
    concurrent_reads,
    concurrent_writes,
    concurrent_mixed,
    segment_count_comparison
);
criterion_main!(benches);
