//! # Request and Response Shapes
//!
//! Purpose: Define the pre-shaped request objects handed to a `TableClient`
//! and the row result it hands back.
//!
//! ## Design Principles
//!
//! 1. **Validate on Construction**: Constructors reject requests a store would
//!    refuse (empty table, empty or oversized row key, empty families) so the
//!    failure surfaces before any I/O.
//! 2. **Typed Deletes**: A delete names either a whole family or a set of
//!    columns inside it, instead of encoding that choice in nil map values.
//! 3. **Ordered Maps**: `BTreeMap` keeps qualifier iteration stable and gives
//!    last-write-wins for duplicate names while a batch is being shaped.
//!
//! ## Mutation Layout
//!
//! ```text
//! Put:    family -> { qualifier -> value }
//! Delete: family -> Family                  (every column in the family)
//!         family -> Columns{ qualifier.. }  (only the named columns)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;

use crate::error::{ClientError, ClientResult};
use crate::types::{Cell, MAX_ROW_KEY_SIZE};

/// Family -> qualifier -> value mapping for puts.
pub type FamilyValues = BTreeMap<String, BTreeMap<String, Bytes>>;

/// Family -> delete scope mapping for deletes.
pub type FamilyDeletes = BTreeMap<String, ColumnDelete>;

/// Scope of a delete within one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDelete {
    /// Remove every column stored under the family.
    Family,
    /// Remove only the listed qualifiers.
    Columns(BTreeSet<String>),
}

/// Mutation payload carried by a `MutateRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Put(FamilyValues),
    Delete(FamilyDeletes),
}

/// A single-row put or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutateRequest {
    table: Bytes,
    key: Bytes,
    mutation: Mutation,
}

impl MutateRequest {
    /// Builds a put request.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidRequest` for an empty table, an empty or
    /// oversized row key, no families, or a family without qualifiers.
    pub fn put(
        table: impl Into<Bytes>,
        key: impl Into<Bytes>,
        values: FamilyValues,
    ) -> ClientResult<Self> {
        let (table, key) = validate_target(table.into(), key.into())?;
        if values.is_empty() {
            return Err(ClientError::invalid("put without column families"));
        }
        for (family, columns) in &values {
            validate_family(family)?;
            if columns.is_empty() {
                return Err(ClientError::invalid(format!(
                    "put without columns in family {family}"
                )));
            }
        }
        Ok(MutateRequest {
            table,
            key,
            mutation: Mutation::Put(values),
        })
    }

    /// Builds a delete request.
    ///
    /// # Errors
    /// Same target checks as [`MutateRequest::put`]; a `Columns` scope must
    /// name at least one qualifier.
    pub fn delete(
        table: impl Into<Bytes>,
        key: impl Into<Bytes>,
        deletes: FamilyDeletes,
    ) -> ClientResult<Self> {
        let (table, key) = validate_target(table.into(), key.into())?;
        if deletes.is_empty() {
            return Err(ClientError::invalid("delete without column families"));
        }
        for (family, scope) in &deletes {
            validate_family(family)?;
            if let ColumnDelete::Columns(columns) = scope {
                if columns.is_empty() {
                    return Err(ClientError::invalid(format!(
                        "delete without columns in family {family}"
                    )));
                }
            }
        }
        Ok(MutateRequest {
            table,
            key,
            mutation: Mutation::Delete(deletes),
        })
    }

    pub fn table(&self) -> &Bytes {
        &self.table
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (Bytes, Bytes, Mutation) {
        (self.table, self.key, self.mutation)
    }
}

/// A full-row read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    table: Bytes,
    key: Bytes,
}

impl GetRequest {
    pub fn new(table: impl Into<Bytes>, key: impl Into<Bytes>) -> ClientResult<Self> {
        let (table, key) = validate_target(table.into(), key.into())?;
        Ok(GetRequest { table, key })
    }

    pub fn table(&self) -> &Bytes {
        &self.table
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }
}

/// A range read over row keys.
///
/// `start` is inclusive and `stop` exclusive; both are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    table: Bytes,
    start: Option<Bytes>,
    stop: Option<Bytes>,
    reverse: bool,
    limit: Option<usize>,
}

impl ScanRequest {
    pub fn new(table: impl Into<Bytes>) -> ClientResult<Self> {
        let table = table.into();
        if table.is_empty() {
            return Err(ClientError::invalid("empty table name"));
        }
        Ok(ScanRequest {
            table,
            start: None,
            stop: None,
            reverse: false,
            limit: None,
        })
    }

    pub fn with_start(mut self, start: impl Into<Bytes>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_stop(mut self, stop: impl Into<Bytes>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &Bytes {
        &self.table
    }

    pub fn start(&self) -> Option<&Bytes> {
        self.start.as_ref()
    }

    pub fn stop(&self) -> Option<&Bytes> {
        self.stop.as_ref()
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns true when `key` falls inside `[start, stop)`.
    pub fn contains(&self, key: &[u8]) -> bool {
        if let Some(start) = &self.start {
            if key < start.as_ref() {
                return false;
            }
        }
        if let Some(stop) = &self.stop {
            if key >= stop.as_ref() {
                return false;
            }
        }
        true
    }
}

/// Cells of one row, in the order the store returned them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowResult {
    pub key: Bytes,
    pub cells: Vec<Cell>,
}

impl RowResult {
    pub fn new(key: impl Into<Bytes>, cells: Vec<Cell>) -> Self {
        RowResult {
            key: key.into(),
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn validate_target(table: Bytes, key: Bytes) -> ClientResult<(Bytes, Bytes)> {
    if table.is_empty() {
        return Err(ClientError::invalid("empty table name"));
    }
    if key.is_empty() {
        return Err(ClientError::invalid("empty row key"));
    }
    if key.len() > MAX_ROW_KEY_SIZE {
        return Err(ClientError::invalid(format!(
            "row key of {} bytes exceeds {MAX_ROW_KEY_SIZE}",
            key.len()
        )));
    }
    Ok((table, key))
}

fn validate_family(family: &str) -> ClientResult<()> {
    if family.is_empty() {
        return Err(ClientError::invalid("empty column family"));
    }
    Ok(())
}
