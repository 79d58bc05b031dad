//! # rowkv Row Accessor
//!
//! Purpose: Provide single-row Put, Get and Delete helpers for a
//! column-family store, on top of any `TableClient` implementation.
//!
//! ## Design Principles
//! 1. **Thin Adapter**: Shape requests, submit, validate; nothing is retried,
//!    cached or kept between calls.
//! 2. **Capability Seam**: The store is reached only through `TableClient`, so
//!    tests swap in doubles without a cluster.
//! 3. **Two Local Errors**: `NotExist` for rows without cells, `DataCorrupt`
//!    for a present row missing the requested column.

mod accessor;
mod metrics;

pub use accessor::{build_put, RowAccessor};
pub use metrics::{
    AccessorMetrics, LatencyHistogram, LatencySnapshot, MetricsSnapshot,
    DEFAULT_LATENCY_BUCKETS_US,
};
