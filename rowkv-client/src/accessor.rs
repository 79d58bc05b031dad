//! # Row Accessor API
//!
//! Purpose: Expose single-row put/get/delete helpers over any `TableClient`,
//! each bounded by a per-call timeout.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `RowAccessor` hides request shaping and result
//!    validation behind one call per operation.
//! 2. **Borrow-Friendly API**: Accept `&[u8]` / `&str` and copy only into the
//!    request buffers.
//! 3. **Scoped Deadlines**: Every call builds its own `CallScope`, released on
//!    return whatever the outcome.
//! 4. **Pass Errors Through**: Client failures come back unchanged; only
//!    `NotExist` and `DataCorrupt` are produced here.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::error;

use rowkv_common::{
    AccessorConfig, CallScope, Cell, ClientResult, ColV, ColumnDelete, FamilyDeletes,
    FamilyValues, GetRequest, MutateRequest, RowError, RowOutcome, RowResult, ScanRequest,
    TableClient, DEFAULT_TIMEOUT_MS, FAMILY,
};

use crate::metrics::AccessorMetrics;

/// Builds the put request for a batch of cells without submitting it.
///
/// Cells with the same name collapse to the last one in `cells`.
pub fn build_put(table: &[u8], key: &[u8], cells: &[ColV]) -> ClientResult<MutateRequest> {
    MutateRequest::put(
        Bytes::copy_from_slice(table),
        Bytes::copy_from_slice(key),
        family_values(cells),
    )
}

/// Single-row operations against the `F` family of a table.
///
/// All reads fetch the whole row and filter locally; rows are expected to
/// hold only a handful of columns.
#[derive(Debug)]
pub struct RowAccessor<C> {
    client: C,
    metrics: Arc<AccessorMetrics>,
    default_timeout: Duration,
}

impl<C: TableClient> RowAccessor<C> {
    /// Wraps a client with the default configuration.
    pub fn new(client: C) -> Self {
        RowAccessor {
            client,
            metrics: Arc::new(AccessorMetrics::new()),
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Wraps a client, taking the default timeout from `config`.
    pub fn with_config(client: C, config: &AccessorConfig) -> Self {
        RowAccessor {
            client,
            metrics: Arc::new(AccessorMetrics::new()),
            default_timeout: config.default_timeout(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn metrics(&self) -> &Arc<AccessorMetrics> {
        &self.metrics
    }

    /// Timeout for callers that do not carry their own.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Writes one column of a row.
    pub fn put_cell(
        &self,
        table: &[u8],
        key: &[u8],
        column: &str,
        data: &[u8],
        timeout: Duration,
    ) -> RowOutcome<()> {
        self.observe(|| {
            let mut columns = BTreeMap::new();
            columns.insert(column.to_string(), Bytes::copy_from_slice(data));
            let mut values = FamilyValues::new();
            values.insert(FAMILY.to_string(), columns);

            let req = MutateRequest::put(
                Bytes::copy_from_slice(table),
                Bytes::copy_from_slice(key),
                values,
            )?;
            self.submit(req, timeout)
        })
    }

    /// Writes several columns of a row in one mutation.
    ///
    /// Duplicate names are last-write-wins within the batch.
    pub fn put_cells(
        &self,
        table: &[u8],
        key: &[u8],
        timeout: Duration,
        cells: &[ColV],
    ) -> RowOutcome<()> {
        self.observe(|| {
            let req = build_put(table, key, cells)?;
            self.submit(req, timeout)
        })
    }

    /// Deletes every column of the row's family.
    pub fn delete_row(&self, table: &[u8], key: &[u8], timeout: Duration) -> RowOutcome<()> {
        self.observe(|| {
            let mut deletes = FamilyDeletes::new();
            deletes.insert(FAMILY.to_string(), ColumnDelete::Family);
            self.submit_delete(table, key, deletes, timeout)
        })
    }

    /// Deletes one column of the row.
    pub fn delete_cell(
        &self,
        table: &[u8],
        key: &[u8],
        column: &str,
        timeout: Duration,
    ) -> RowOutcome<()> {
        self.observe(|| {
            let mut deletes = FamilyDeletes::new();
            deletes.insert(
                FAMILY.to_string(),
                ColumnDelete::Columns(BTreeSet::from([column.to_string()])),
            );
            self.submit_delete(table, key, deletes, timeout)
        })
    }

    /// Returns every cell of the row in store order.
    ///
    /// # Errors
    /// `RowError::NotExist` when the row has no cells.
    pub fn get_row(&self, table: &[u8], key: &[u8], timeout: Duration) -> RowOutcome<Vec<Cell>> {
        self.observe(|| self.fetch_row(table, key, timeout).map(|row| row.cells))
    }

    /// Returns the value of the column named exactly `column`.
    ///
    /// # Errors
    /// `RowError::NotExist` when the row is absent, `RowError::DataCorrupt`
    /// when the row exists without that column.
    pub fn get_cell_by_name(
        &self,
        table: &[u8],
        key: &[u8],
        column: &str,
        timeout: Duration,
    ) -> RowOutcome<Bytes> {
        self.observe(|| {
            let row = self.fetch_row(table, key, timeout)?;
            row.cells
                .into_iter()
                .find(|cell| cell.has_qualifier(column))
                .map(|cell| cell.value)
                .ok_or_else(|| RowError::DataCorrupt {
                    column: column.to_string(),
                })
        })
    }

    /// Returns the value of the first column whose name starts with `tag`.
    ///
    /// "First" is the order the store returned the cells in; when several
    /// qualifiers share the tag byte, no other tie-break is applied.
    pub fn get_cell_by_first_byte(
        &self,
        table: &[u8],
        key: &[u8],
        tag: u8,
        timeout: Duration,
    ) -> RowOutcome<Bytes> {
        self.observe(|| {
            let row = self.fetch_row(table, key, timeout)?;
            row.cells
                .into_iter()
                .find(|cell| cell.first_qualifier_byte() == Some(tag))
                .map(|cell| cell.value)
                .ok_or_else(|| RowError::DataCorrupt {
                    column: format!("first byte {tag:#04x}"),
                })
        })
    }

    /// Returns the non-empty rows matched by `req`, in the store's key order.
    ///
    /// An empty range is an empty list, not `NotExist`.
    pub fn scan_rows(&self, req: ScanRequest, timeout: Duration) -> RowOutcome<Vec<RowResult>> {
        self.observe(|| {
            let scope = CallScope::with_timeout(timeout);
            let rows = self.client.scan(&scope, req)?;
            Ok(rows.into_iter().filter(|row| !row.is_empty()).collect())
        })
    }

    fn submit(&self, req: MutateRequest, timeout: Duration) -> RowOutcome<()> {
        let scope = CallScope::with_timeout(timeout);
        self.client.put(&scope, req)?;
        Ok(())
    }

    fn submit_delete(
        &self,
        table: &[u8],
        key: &[u8],
        deletes: FamilyDeletes,
        timeout: Duration,
    ) -> RowOutcome<()> {
        let req = MutateRequest::delete(
            Bytes::copy_from_slice(table),
            Bytes::copy_from_slice(key),
            deletes,
        )?;
        self.submit(req, timeout)
    }

    /// Reads the full row, mapping "no cells" and "no result" to `NotExist`.
    fn fetch_row(&self, table: &[u8], key: &[u8], timeout: Duration) -> RowOutcome<RowResult> {
        let scope = CallScope::with_timeout(timeout);
        let req = GetRequest::new(Bytes::copy_from_slice(table), Bytes::copy_from_slice(key))?;
        match self.client.get(&scope, req)? {
            None => {
                error!(
                    table = %String::from_utf8_lossy(table),
                    key = %String::from_utf8_lossy(key),
                    "table client returned no result"
                );
                Err(RowError::NotExist)
            }
            Some(row) if row.is_empty() => Err(RowError::NotExist),
            Some(row) => Ok(row),
        }
    }

    fn observe<T>(&self, op: impl FnOnce() -> RowOutcome<T>) -> RowOutcome<T> {
        self.metrics.record_start();
        let started = Instant::now();
        let outcome = op();
        self.metrics.record_end(started.elapsed(), &outcome);
        outcome
    }
}

/// Shapes a cell batch into the single-family put mapping.
fn family_values(cells: &[ColV]) -> FamilyValues {
    let mut columns = BTreeMap::new();
    for cell in cells {
        columns.insert(cell.name.clone(), cell.data.clone());
    }
    let mut values = FamilyValues::new();
    values.insert(FAMILY.to_string(), columns);
    values
}

#[cfg(test)]
mod tests {
    use rowkv_common::{ClientError, Mutation};

    use super::*;

    #[test]
    fn build_put_keeps_last_duplicate() {
        let cells = [
            ColV::new("name", "alice"),
            ColV::new("age", "41"),
            ColV::new("name", "bob"),
        ];
        let req = build_put(b"users", b"u1", &cells).unwrap();
        let Mutation::Put(values) = req.mutation() else {
            panic!("expected a put");
        };
        assert_eq!(values.len(), 1);
        let columns = &values[FAMILY];
        assert_eq!(columns.len(), 2);
        assert_eq!(columns["name"], Bytes::from_static(b"bob"));
        assert_eq!(columns["age"], Bytes::from_static(b"41"));
    }

    #[test]
    fn build_put_rejects_empty_batch() {
        let err = build_put(b"users", b"u1", &[]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest { .. }));
    }
}
