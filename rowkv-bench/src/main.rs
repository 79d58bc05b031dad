//! # Row Accessor Benchmark Harness
//!
//! Purpose: Provide a repeatable benchmark driver for `RowAccessor` over the
//! in-memory store so per-operation overhead can be compared over time.
//!
//! ## Design Principles
//! 1. **Deterministic Workload**: Use a fixed PRNG seed for stable comparisons.
//! 2. **Allocation Control**: Pre-build keys/values to keep setup costs off the hot path.
//! 3. **Strategy Pattern Awareness**: The accessor is generic over `TableClient`,
//!    so the same harness can drive any backend.
//!
//! Usage: `rowkv-bench [row_count] [op_count] [value_size] [config.json]`

use std::env;
use std::fs;
use std::hint::black_box;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use rowkv_client::RowAccessor;
use rowkv_common::{init_logging, AccessorConfig, ColV};
use rowkv_engine::MemoryStore;

const DEFAULT_ROW_COUNT: usize = 1 << 14;
const DEFAULT_OP_COUNT: usize = 200_000;
const DEFAULT_VALUE_SIZE: usize = 128;

const TABLE: &[u8] = b"bench";
const COLUMNS: [&str; 4] = ["alpha", "bravo", "charlie", "delta"];

struct BenchConfig {
    requested_rows: usize,
    row_count: usize,
    row_mask: usize,
    op_count: usize,
    value_size: usize,
    accessor: AccessorConfig,
}

impl BenchConfig {
    fn from_args() -> Result<Self> {
        let mut args = env::args().skip(1);
        let requested_rows = parse_usize(args.next(), DEFAULT_ROW_COUNT);
        let op_count = parse_usize(args.next(), DEFAULT_OP_COUNT);
        let value_size = parse_usize(args.next(), DEFAULT_VALUE_SIZE);
        let accessor = match args.next() {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("reading config {path}"))?;
                AccessorConfig::from_json(&raw)
                    .with_context(|| format!("parsing config {path}"))?
            }
            None => AccessorConfig::default(),
        };

        let row_count = normalize_power_of_two(requested_rows);
        Ok(BenchConfig {
            requested_rows,
            row_count,
            row_mask: row_count - 1,
            op_count,
            value_size,
            accessor,
        })
    }
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value.and_then(|raw| raw.parse().ok()).unwrap_or(fallback)
}

fn normalize_power_of_two(value: usize) -> usize {
    value.max(1).next_power_of_two()
}

/// Tiny deterministic PRNG; XorShift keeps the workload reproducible.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[inline]
    fn next_index(&mut self, mask: usize) -> usize {
        (self.next_u64() as usize) & mask
    }
}

fn build_keys(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("row-{i:08}").into_bytes())
        .collect()
}

fn build_values(count: usize, size: usize, seed: u64) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| {
            let mut buffer = vec![0u8; size];
            let bytes = (seed ^ (i as u64)).to_le_bytes();
            let copy_len = buffer.len().min(bytes.len());
            buffer[..copy_len].copy_from_slice(&bytes[..copy_len]);
            buffer
        })
        .collect()
}

fn report(label: &str, ops: usize, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let ops_per_sec = (ops as f64) / secs;
    let nanos_per_op = (secs * 1e9) / (ops as f64);
    println!(
        "{label}: {ops} ops in {secs:.3}s ({ops_per_sec:.0} ops/s, {nanos_per_op:.1} ns/op)"
    );
}

fn main() {
    if let Err(err) = run() {
        eprintln!("rowkv-bench failed: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = BenchConfig::from_args()?;
    init_logging(&config.accessor.log).context("installing logger")?;

    let store = MemoryStore::new();
    store.create_table(TABLE);
    let rows = RowAccessor::with_config(store, &config.accessor);
    let timeout = rows.default_timeout();

    let keys = build_keys(config.row_count);
    let values = build_values(config.row_count, config.value_size, 0x5A5A_5A5A_5A5A_5A5A);

    for (key, value) in keys.iter().zip(&values) {
        let cells: Vec<ColV> = COLUMNS
            .iter()
            .map(|name| ColV::new(*name, value.clone()))
            .collect();
        rows.put_cells(TABLE, key, timeout, &cells)
            .context("preloading rows")?;
    }

    info!(
        requested = config.requested_rows,
        rows = config.row_count,
        ops = config.op_count,
        value_size = config.value_size,
        "rows preloaded"
    );

    let mut rng = XorShift64::new(0x1234_5678_9ABC_DEF0);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.row_mask);
        let value = rows.get_cell_by_name(TABLE, &keys[idx], COLUMNS[idx % COLUMNS.len()], timeout)?;
        black_box(value);
    }
    report("GET by name", config.op_count, start.elapsed());

    let mut rng = XorShift64::new(0x0BAD_F00D_DEAD_BEEF);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.row_mask);
        let tag = COLUMNS[idx % COLUMNS.len()].as_bytes()[0];
        let value = rows.get_cell_by_first_byte(TABLE, &keys[idx], tag, timeout)?;
        black_box(value);
    }
    report("GET by first byte", config.op_count, start.elapsed());

    let mut rng = XorShift64::new(0x0FED_CBA9_8765_4321);
    let start = Instant::now();
    for _ in 0..config.op_count {
        let idx = rng.next_index(config.row_mask);
        let mut value = values[idx].clone();
        if let Some(first) = value.get_mut(0) {
            *first ^= 0xFF;
        }
        rows.put_cell(TABLE, &keys[idx], COLUMNS[0], &value, timeout)?;
    }
    report("PUT cell", config.op_count, start.elapsed());

    let snapshot = rows.metrics().snapshot();
    info!(
        ops = snapshot.ops_total,
        errors = snapshot.client_errors,
        not_exist = snapshot.not_exist,
        data_corrupt = snapshot.data_corrupt,
        "accessor metrics"
    );
    println!("latency buckets (us <= bound): {:?}", snapshot.latency.bounds_us);
    println!("latency counts (+overflow):   {:?}", snapshot.latency.buckets);

    Ok(())
}
