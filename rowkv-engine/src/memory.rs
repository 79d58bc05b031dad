//! # In-Memory Store
//!
//! Provide a wide-column backend that speaks the `TableClient` capability, so
//! the row accessor can be exercised and benchmarked without a cluster.
//!
//! ## Usage
//!
//! - Use `MemoryStore::new()` for a default sharded store, then
//!   `create_table` for every table the caller will touch.
//! - Use `with_latency` to make every request take a fixed time; requests
//!   whose scope expires first fail with `DeadlineExceeded`.
//!
//! ## Design Principles
//!
//! 1. **Sharded Locks**: Rows hash to shards, each behind its own lock.
//! 2. **Sorted Rows**: Families and qualifiers live in `BTreeMap`s so reads
//!    return cells in lexicographic order, as a region server would.
//! 3. **Shared Buffers**: Values are `Bytes`; reads clone handles, not data.
//! 4. **Strategy Pattern**: Implements `TableClient` to keep callers decoupled.
//!
//! ## Structure Overview
//!
//! ```text
//! MemoryStore
//!   ├── tables: RwLock<HashSet<Bytes>>
//!   └── shards: Vec<Shard>
//!         └── Shard
//!               └── inner: RwLock<ShardInner>
//!                     └── tables: HashMap<Bytes, BTreeMap<Bytes, Row>>
//!                           └── Row { families: BTreeMap<Bytes, BTreeMap<Bytes, Bytes>> }
//! ```

use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};
use std::time::Duration;

use ahash::RandomState;
use bytes::Bytes;
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use tracing::debug;

use rowkv_common::{
    CallScope, Cell, ClientError, ClientResult, ColumnDelete, FamilyDeletes, FamilyValues,
    GetRequest, MutateRequest, Mutation, RowResult, ScanRequest, TableClient,
};

/// Default shards = CPU count * multiplier to reduce lock contention.
const DEFAULT_SHARD_MULTIPLIER: usize = 4;

/// Stored columns of a single row.
#[derive(Debug, Default)]
struct Row {
    families: BTreeMap<Bytes, BTreeMap<Bytes, Bytes>>,
}

impl Row {
    /// Merges put values into the row; existing qualifiers are overwritten.
    fn apply_put(&mut self, values: FamilyValues) {
        for (family, columns) in values {
            let stored = self.families.entry(Bytes::from(family)).or_default();
            for (qualifier, value) in columns {
                stored.insert(Bytes::from(qualifier), value);
            }
        }
    }

    /// Removes whole families or single qualifiers.
    fn apply_delete(&mut self, deletes: FamilyDeletes) {
        for (family, scope) in deletes {
            match scope {
                ColumnDelete::Family => {
                    self.families.remove(family.as_bytes());
                }
                ColumnDelete::Columns(columns) => {
                    let emptied = match self.families.get_mut(family.as_bytes()) {
                        Some(stored) => {
                            for qualifier in &columns {
                                stored.remove(qualifier.as_bytes());
                            }
                            stored.is_empty()
                        }
                        None => false,
                    };
                    if emptied {
                        self.families.remove(family.as_bytes());
                    }
                }
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Flattens the row into cells ordered by family, then qualifier.
    fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for (family, columns) in &self.families {
            for (qualifier, value) in columns {
                cells.push(Cell {
                    family: family.clone(),
                    qualifier: qualifier.clone(),
                    value: value.clone(),
                });
            }
        }
        cells
    }
}

/// Per-shard storage: table name -> ordered rows.
#[derive(Debug)]
struct ShardInner {
    tables: HashMap<Bytes, BTreeMap<Bytes, Row>, RandomState>,
}

impl ShardInner {
    fn new(hash_state: RandomState) -> Self {
        ShardInner {
            tables: HashMap::with_hasher(hash_state),
        }
    }
}

/// Per-shard lock wrapper.
#[derive(Debug)]
struct Shard {
    inner: RwLock<ShardInner>,
}

/// Sharded in-memory implementation of `TableClient`.
#[derive(Debug)]
pub struct MemoryStore {
    /// Known tables; requests against anything else fail.
    tables: RwLock<HashSet<Bytes, RandomState>>,
    /// Per-shard row storage.
    shards: Vec<Shard>,
    /// Bitmask for fast shard selection (power-of-two shard count).
    shard_mask: usize,
    /// Hash state used to pick shards deterministically.
    hash_state: RandomState,
    /// Artificial service time applied to every request.
    latency: Option<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a store with shards sized to the available parallelism.
    pub fn new() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_shard_count(cpus * DEFAULT_SHARD_MULTIPLIER)
    }

    /// Creates a store with an explicit shard count.
    ///
    /// The count is normalized to the next power of two to enable fast masking.
    pub fn with_shard_count(shards: usize) -> Self {
        let shard_count = normalize_shard_count(shards);
        let hash_state = RandomState::new();
        let mut shard_vec = Vec::with_capacity(shard_count);
        for _ in 0..shard_count {
            shard_vec.push(Shard {
                inner: RwLock::new(ShardInner::new(hash_state.clone())),
            });
        }

        MemoryStore {
            tables: RwLock::new(HashSet::with_hasher(hash_state.clone())),
            shards: shard_vec,
            shard_mask: shard_count - 1,
            hash_state,
            latency: None,
        }
    }

    /// Makes every request take `latency` before it is served.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Registers a table. Returns false if it already existed.
    pub fn create_table(&self, table: impl Into<Bytes>) -> bool {
        self.tables.write().insert(table.into())
    }

    /// Drops a table and every row in it. Returns false if it was unknown.
    pub fn drop_table(&self, table: &[u8]) -> bool {
        if !self.tables.write().remove(table) {
            return false;
        }
        for shard in &self.shards {
            shard.inner.write().tables.remove(table);
        }
        true
    }

    /// Returns the number of non-empty rows stored in `table`.
    pub fn row_count(&self, table: &[u8]) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.inner.read().tables.get(table).map_or(0, BTreeMap::len))
            .sum()
    }

    fn ensure_table(&self, table: &[u8]) -> ClientResult<()> {
        if self.tables.read().contains(table) {
            Ok(())
        } else {
            Err(ClientError::table_not_found(table))
        }
    }

    /// Applies the configured latency, bounded by the scope deadline.
    fn serve_delay(&self, scope: &CallScope) -> ClientResult<()> {
        scope.check()?;
        let Some(latency) = self.latency else {
            return Ok(());
        };
        match scope.remaining() {
            Some(remaining) if remaining < latency => {
                std::thread::sleep(remaining);
                Err(ClientError::DeadlineExceeded)
            }
            _ => {
                std::thread::sleep(latency);
                scope.check()
            }
        }
    }

    /// Hashes (table, key) to its owning shard index.
    fn shard_index(&self, table: &[u8], key: &[u8]) -> usize {
        let mut hasher = self.hash_state.build_hasher();
        hasher.write(table);
        hasher.write(key);
        (hasher.finish() as usize) & self.shard_mask
    }

    fn shard_for(&self, table: &[u8], key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(table, key)]
    }
}

impl TableClient for MemoryStore {
    /// Applies a put or delete under the owning shard's write lock.
    ///
    /// Rows left without any family are removed so later reads see them as
    /// missing.
    fn put(&self, scope: &CallScope, req: MutateRequest) -> ClientResult<()> {
        self.serve_delay(scope)?;
        self.ensure_table(req.table())?;

        let (table, key, mutation) = req.into_parts();
        let shard = self.shard_for(&table, &key);
        let mut inner = shard.inner.write();
        let rows = inner.tables.entry(table.clone()).or_default();

        match mutation {
            Mutation::Put(values) => {
                rows.entry(key.clone()).or_default().apply_put(values);
                debug!(table = ?table, key = ?key, "row put applied");
            }
            Mutation::Delete(deletes) => {
                let emptied = match rows.get_mut(&key) {
                    Some(row) => {
                        row.apply_delete(deletes);
                        row.is_empty()
                    }
                    None => false,
                };
                if emptied {
                    rows.remove(&key);
                }
                debug!(table = ?table, key = ?key, "row delete applied");
            }
        }
        Ok(())
    }

    /// Returns the row's cells, or an empty result for a missing row.
    fn get(&self, scope: &CallScope, req: GetRequest) -> ClientResult<Option<RowResult>> {
        self.serve_delay(scope)?;
        self.ensure_table(req.table())?;

        let shard = self.shard_for(req.table(), req.key());
        let inner = shard.inner.read();
        let cells = inner
            .tables
            .get(req.table())
            .and_then(|rows| rows.get(req.key()))
            .map(Row::cells)
            .unwrap_or_default();
        Ok(Some(RowResult::new(req.key().clone(), cells)))
    }

    /// Collects matching rows from every shard, then orders and limits them.
    fn scan(&self, scope: &CallScope, req: ScanRequest) -> ClientResult<Vec<RowResult>> {
        self.serve_delay(scope)?;
        self.ensure_table(req.table())?;

        let mut rows = Vec::new();
        for shard in &self.shards {
            scope.check()?;
            let inner = shard.inner.read();
            if let Some(table_rows) = inner.tables.get(req.table()) {
                for (key, row) in table_rows {
                    if req.contains(key) && !row.is_empty() {
                        rows.push(RowResult::new(key.clone(), row.cells()));
                    }
                }
            }
        }

        if req.is_reverse() {
            rows.sort_by(|a, b| b.key.cmp(&a.key));
        } else {
            rows.sort_by(|a, b| a.key.cmp(&b.key));
        }
        if let Some(limit) = req.limit() {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

/// Normalizes shard counts to a power of two for fast masking.
fn normalize_shard_count(count: usize) -> usize {
    let count = count.max(1);
    count.next_power_of_two()
}
