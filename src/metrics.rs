//! Performance metrics for search operations
//!
//! Lightweight in-memory counters so interactive latency can be watched in production
//! and logged on exit.
//!
//! ## Metrics Tracked
//!
//! - Searches (total, wildcard, empty results)
//! - Result cache hits and misses
//! - Tree rebuilds and failed rebuilds
//! - Per-operation latencies (search, rebuild)
//!
//! ## Design
//!
//! - Lock-free atomic counters for high-frequency operations
//! - DashMap for low-contention timing storage
//! - Only the most recent samples per operation are kept for percentiles

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

/// Samples retained per operation
pub const MAX_TIMING_SAMPLES: usize = 1024;

/// Global metrics registry (singleton)
static METRICS: once_cell::sync::Lazy<Arc<Metrics>> = once_cell::sync::Lazy::new(|| {
    Arc::new(Metrics::new())
});

/// Get the global metrics instance
pub fn metrics() -> &'static Arc<Metrics> {
    &METRICS
}

#[derive(Debug)]
pub struct Metrics {
    searches: AtomicU64,
    wildcard_searches: AtomicU64,
    empty_results: AtomicU64,

    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    rebuilds: AtomicU64,
    failed_rebuilds: AtomicU64,
    last_tree_size: AtomicUsize,

    // Operation name -> most recent durations in microseconds
    operation_timings: DashMap<String, VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            searches: AtomicU64::new(0),
            wildcard_searches: AtomicU64::new(0),
            empty_results: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
            failed_rebuilds: AtomicU64::new(0),
            last_tree_size: AtomicUsize::new(0),
            operation_timings: DashMap::new(),
        }
    }

    /// Records a completed search
    pub fn record_search(&self, wildcard: bool, total: usize) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        if wildcard {
            self.wildcard_searches.fetch_add(1, Ordering::Relaxed);
        }
        if total == 0 {
            self.empty_results.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the result cache hit rate (0.0 to 1.0)
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Records a successful rebuild producing a tree of `nodes` entities
    pub fn record_rebuild(&self, nodes: usize) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        self.last_tree_size.store(nodes, Ordering::Relaxed);
    }

    pub fn record_failed_rebuild(&self) {
        self.failed_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the timing of an operation
    pub fn record_timing(&self, operation: &str, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        let mut samples = self.operation_timings.entry(operation.to_string()).or_default();
        if samples.len() >= MAX_TIMING_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(micros);
    }

    /// Gets summary statistics for an operation over its retained samples
    pub fn operation_stats(&self, operation: &str) -> Option<OperationStats> {
        let timings = self.operation_timings.get(operation)?;
        let mut sorted: Vec<u64> = timings.value().iter().copied().collect();
        drop(timings);
        sorted.sort_unstable();

        let count = sorted.len();
        if count == 0 {
            return Some(OperationStats::default());
        }

        let sum: u64 = sorted.iter().sum();
        let p95_idx = (count as f64 * 0.95) as usize;
        let p99_idx = (count as f64 * 0.99) as usize;

        Some(OperationStats {
            count,
            min_micros: sorted[0],
            max_micros: sorted[count - 1],
            mean_micros: sum / count as u64,
            p50_micros: sorted[count / 2],
            p95_micros: sorted[p95_idx.min(count - 1)],
            p99_micros: sorted[p99_idx.min(count - 1)],
        })
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            searches: self.searches.load(Ordering::Relaxed),
            wildcard_searches: self.wildcard_searches.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: self.cache_hit_rate(),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            failed_rebuilds: self.failed_rebuilds.load(Ordering::Relaxed),
            last_tree_size: self.last_tree_size.load(Ordering::Relaxed),
            search_latency: self.operation_stats("search"),
        }
    }

    /// Resets all metrics (useful for testing)
    pub fn reset(&self) {
        self.searches.store(0, Ordering::Relaxed);
        self.wildcard_searches.store(0, Ordering::Relaxed);
        self.empty_results.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.rebuilds.store(0, Ordering::Relaxed);
        self.failed_rebuilds.store(0, Ordering::Relaxed);
        self.last_tree_size.store(0, Ordering::Relaxed);
        self.operation_timings.clear();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct OperationStats {
    pub count: usize,
    pub min_micros: u64,
    pub max_micros: u64,
    pub mean_micros: u64,
    pub p50_micros: u64,  // Median
    pub p95_micros: u64,
    pub p99_micros: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub searches: u64,
    pub wildcard_searches: u64,
    pub empty_results: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub rebuilds: u64,
    pub failed_rebuilds: u64,
    pub last_tree_size: usize,
    pub search_latency: Option<OperationStats>,
}

/// RAII guard for automatic timing measurement
///
/// Records the duration of a scope into the global registry when dropped.
///
/// # Example
///
/// ```
/// use namespace_search::metrics::TimingGuard;
///
/// fn my_operation() {
///     let _guard = TimingGuard::new("my_operation");
///     // ... do work ...
///     // Duration automatically recorded when _guard is dropped
/// }
/// ```
pub struct TimingGuard {
    operation: &'static str,
    start: Instant,
}

impl TimingGuard {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        metrics().record_timing(self.operation, self.start.elapsed());
    }
}
