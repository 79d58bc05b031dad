//! # Accessor Metrics
//!
//! Provide lightweight counters and a latency histogram for row accessor
//! calls: how many ran, how they failed, and how long they took.
//!
//! ## Design Principles
//! 1. **Accumulator Pattern**: Use atomic counters to aggregate events cheaply.
//! 2. **Fixed Buckets**: Keep histogram buckets in a contiguous array for cache locality.
//! 3. **Zero-Cost Access**: Expose snapshots as plain structs without heap work
//!    beyond the bucket vectors.
//!
//! ## Notes
//! - Bucket boundaries are expressed in microseconds.
//! - `Ordering::Relaxed` everywhere: fields are read independently, never as a
//!   consistent set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rowkv_common::{RowError, RowOutcome};

/// Default latency bucket boundaries in microseconds.
pub const DEFAULT_LATENCY_BUCKETS_US: [u64; 12] =
    [1, 2, 5, 10, 20, 50, 100, 200, 500, 1_000, 2_000, 5_000];

/// Snapshot of all accessor metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of operations started.
    pub ops_total: u64,
    /// Operations that failed with a client (passthrough) error.
    pub client_errors: u64,
    /// Operations that ended in `NotExist`.
    pub not_exist: u64,
    /// Operations that ended in `DataCorrupt`.
    pub data_corrupt: u64,
    /// Operations currently running.
    pub inflight: u64,
    /// Latency histogram snapshot.
    pub latency: LatencySnapshot,
}

/// Snapshot of the latency histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencySnapshot {
    /// Bucket boundaries in microseconds.
    pub bounds_us: Vec<u64>,
    /// Bucket counts, including the overflow bucket at the end.
    pub buckets: Vec<u64>,
    /// Total number of samples.
    pub samples: u64,
    /// Sum of latencies in microseconds.
    pub sum_us: u64,
}

/// Thread-safe metrics aggregator shared by a `RowAccessor`.
#[derive(Debug)]
pub struct AccessorMetrics {
    ops_total: AtomicU64,
    client_errors: AtomicU64,
    not_exist: AtomicU64,
    data_corrupt: AtomicU64,
    inflight: AtomicU64,
    latency: LatencyHistogram,
}

impl Default for AccessorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessorMetrics {
    /// Creates a new aggregator with the default latency buckets.
    pub fn new() -> Self {
        Self::with_latency_buckets(DEFAULT_LATENCY_BUCKETS_US.to_vec())
    }

    /// Creates a new aggregator with custom latency bucket boundaries.
    ///
    /// The boundaries must be sorted ascending and represent microseconds.
    pub fn with_latency_buckets(bounds_us: Vec<u64>) -> Self {
        AccessorMetrics {
            ops_total: AtomicU64::new(0),
            client_errors: AtomicU64::new(0),
            not_exist: AtomicU64::new(0),
            data_corrupt: AtomicU64::new(0),
            inflight: AtomicU64::new(0),
            latency: LatencyHistogram::new(bounds_us),
        }
    }

    /// Records the start of an operation.
    pub fn record_start(&self) {
        self.ops_total.fetch_add(1, Ordering::Relaxed);
        self.inflight.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the end of an operation: latency plus its outcome class.
    pub fn record_end<T>(&self, latency: Duration, outcome: &RowOutcome<T>) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
        self.latency.record(latency);
        let counter = match outcome {
            Ok(_) => return,
            Err(RowError::NotExist) => &self.not_exist,
            Err(RowError::DataCorrupt { .. }) => &self.data_corrupt,
            Err(RowError::Client(_)) => &self.client_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of all counters and histogram buckets.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ops_total: self.ops_total.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            not_exist: self.not_exist.load(Ordering::Relaxed),
            data_corrupt: self.data_corrupt.load(Ordering::Relaxed),
            inflight: self.inflight.load(Ordering::Relaxed),
            latency: self.latency.snapshot(),
        }
    }
}

/// Fixed-bucket latency histogram.
///
/// Uses a linear scan to pick buckets; this is O(buckets) but the list is small
/// and stays hot in cache.
#[derive(Debug)]
pub struct LatencyHistogram {
    bounds_us: Vec<u64>,
    buckets: Vec<AtomicU64>,
    sum_us: AtomicU64,
    samples: AtomicU64,
}

impl LatencyHistogram {
    /// Creates a histogram with `bounds_us.len() + 1` buckets (last is overflow).
    pub fn new(bounds_us: Vec<u64>) -> Self {
        let buckets = (0..=bounds_us.len()).map(|_| AtomicU64::new(0)).collect();
        LatencyHistogram {
            bounds_us,
            buckets,
            sum_us: AtomicU64::new(0),
            samples: AtomicU64::new(0),
        }
    }

    /// Records a latency measurement into the first bucket whose bound is not
    /// below it, or into overflow.
    pub fn record(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.sum_us.fetch_add(micros, Ordering::Relaxed);

        let idx = self
            .bounds_us
            .iter()
            .position(|&bound| micros <= bound)
            .unwrap_or(self.bounds_us.len());
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of the histogram.
    pub fn snapshot(&self) -> LatencySnapshot {
        LatencySnapshot {
            bounds_us: self.bounds_us.clone(),
            buckets: self
                .buckets
                .iter()
                .map(|bucket| bucket.load(Ordering::Relaxed))
                .collect(),
            samples: self.samples.load(Ordering::Relaxed),
            sum_us: self.sum_us.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use rowkv_common::ClientError;

    use super::*;

    #[test]
    fn histogram_buckets_by_upper_bound() {
        let histogram = LatencyHistogram::new(vec![10, 100]);
        histogram.record(Duration::from_micros(5));
        histogram.record(Duration::from_micros(10));
        histogram.record(Duration::from_micros(50));
        histogram.record(Duration::from_millis(1));

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.buckets, vec![2, 1, 1]);
        assert_eq!(snapshot.samples, 4);
        assert_eq!(snapshot.sum_us, 5 + 10 + 50 + 1_000);
    }

    #[test]
    fn outcomes_land_in_their_counters() {
        let metrics = AccessorMetrics::new();
        let outcomes: Vec<RowOutcome<()>> = vec![
            Ok(()),
            Err(RowError::NotExist),
            Err(RowError::DataCorrupt {
                column: "age".to_string(),
            }),
            Err(RowError::Client(ClientError::DeadlineExceeded)),
        ];
        for outcome in &outcomes {
            metrics.record_start();
            metrics.record_end(Duration::from_micros(3), outcome);
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ops_total, 4);
        assert_eq!(snapshot.inflight, 0);
        assert_eq!(snapshot.not_exist, 1);
        assert_eq!(snapshot.data_corrupt, 1);
        assert_eq!(snapshot.client_errors, 1);
        assert_eq!(snapshot.latency.samples, 4);
    }
}
