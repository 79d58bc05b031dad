//! # Table Client Capability
//!
//! The seam between the row accessor and whatever actually talks to the
//! store. Implementations own connections, region lookup and retries; the
//! accessor only hands them pre-shaped requests inside a `CallScope`.

use std::sync::Arc;

use crate::error::ClientResult;
use crate::protocol::{GetRequest, MutateRequest, RowResult, ScanRequest};
use crate::scope::CallScope;

/// Submit-mutation / submit-read capability of an external table client.
///
/// Implementations should call `scope.check()` before doing work and give up
/// once the scope reports an error.
pub trait TableClient: Send + Sync {
    /// Applies a put or delete to one row.
    fn put(&self, scope: &CallScope, req: MutateRequest) -> ClientResult<()>;

    /// Reads every cell of one row.
    ///
    /// A missing row should come back as an empty `RowResult`. `None` means
    /// the client produced no result at all.
    fn get(&self, scope: &CallScope, req: GetRequest) -> ClientResult<Option<RowResult>>;

    /// Reads the rows in a key range, ordered by key.
    fn scan(&self, scope: &CallScope, req: ScanRequest) -> ClientResult<Vec<RowResult>>;
}

impl<T: TableClient + ?Sized> TableClient for &T {
    fn put(&self, scope: &CallScope, req: MutateRequest) -> ClientResult<()> {
        (**self).put(scope, req)
    }

    fn get(&self, scope: &CallScope, req: GetRequest) -> ClientResult<Option<RowResult>> {
        (**self).get(scope, req)
    }

    fn scan(&self, scope: &CallScope, req: ScanRequest) -> ClientResult<Vec<RowResult>> {
        (**self).scan(scope, req)
    }
}

impl<T: TableClient + ?Sized> TableClient for Arc<T> {
    fn put(&self, scope: &CallScope, req: MutateRequest) -> ClientResult<()> {
        (**self).put(scope, req)
    }

    fn get(&self, scope: &CallScope, req: GetRequest) -> ClientResult<Option<RowResult>> {
        (**self).get(scope, req)
    }

    fn scan(&self, scope: &CallScope, req: ScanRequest) -> ClientResult<Vec<RowResult>> {
        (**self).scan(scope, req)
    }
}

impl<T: TableClient + ?Sized> TableClient for Box<T> {
    fn put(&self, scope: &CallScope, req: MutateRequest) -> ClientResult<()> {
        (**self).put(scope, req)
    }

    fn get(&self, scope: &CallScope, req: GetRequest) -> ClientResult<Option<RowResult>> {
        (**self).get(scope, req)
    }

    fn scan(&self, scope: &CallScope, req: ScanRequest) -> ClientResult<Vec<RowResult>> {
        (**self).scan(scope, req)
    }
}
