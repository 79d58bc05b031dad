use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use rowkv_client::RowAccessor;
use rowkv_common::{
    CallScope, CancelToken, Cell, ClientError, ClientResult, ColumnDelete, GetRequest,
    MutateRequest, Mutation, RowError, RowResult, ScanRequest, TableClient, FAMILY,
};

const TABLE: &[u8] = b"users";
const TIMEOUT: Duration = Duration::from_secs(1);

/// Table client that replays canned replies and records what it was sent.
#[derive(Default)]
struct ScriptedClient {
    get_reply: Mutex<Option<ClientResult<Option<RowResult>>>>,
    put_error: Mutex<Option<ClientError>>,
    scan_reply: Mutex<Vec<RowResult>>,
    mutations: Mutex<Vec<MutateRequest>>,
    tokens: Mutex<Vec<CancelToken>>,
}

impl ScriptedClient {
    fn replying(reply: ClientResult<Option<RowResult>>) -> Self {
        let client = ScriptedClient::default();
        *client.get_reply.lock().unwrap() = Some(reply);
        client
    }

    fn with_cells(qualifiers: &[(&'static str, &'static str)]) -> Self {
        let cells = qualifiers
            .iter()
            .map(|(q, v)| Cell::new(FAMILY, *q, *v))
            .collect();
        Self::replying(Ok(Some(RowResult::new("u1", cells))))
    }
}

impl TableClient for ScriptedClient {
    fn put(&self, scope: &CallScope, req: MutateRequest) -> ClientResult<()> {
        self.tokens.lock().unwrap().push(scope.token());
        if let Some(err) = self.put_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.mutations.lock().unwrap().push(req);
        Ok(())
    }

    fn get(&self, scope: &CallScope, _req: GetRequest) -> ClientResult<Option<RowResult>> {
        self.tokens.lock().unwrap().push(scope.token());
        self.get_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(Some(RowResult::default())))
    }

    fn scan(&self, scope: &CallScope, _req: ScanRequest) -> ClientResult<Vec<RowResult>> {
        self.tokens.lock().unwrap().push(scope.token());
        Ok(self.scan_reply.lock().unwrap().clone())
    }
}

#[test]
fn nil_result_is_not_exist() {
    let rows = RowAccessor::new(ScriptedClient::replying(Ok(None)));
    let err = rows.get_row(TABLE, b"u1", TIMEOUT).expect_err("nil result");
    assert_eq!(err, RowError::NotExist);

    let err = rows
        .get_cell_by_name(TABLE, b"u1", "name", TIMEOUT)
        .expect_err("nil result");
    assert_eq!(err, RowError::NotExist);
}

#[test]
fn empty_result_is_not_exist() {
    let rows = RowAccessor::new(ScriptedClient::replying(Ok(Some(RowResult::default()))));
    let err = rows
        .get_cell_by_first_byte(TABLE, b"u1", b'n', TIMEOUT)
        .expect_err("empty row");
    assert_eq!(err, RowError::NotExist);
}

#[test]
fn first_byte_follows_returned_order_not_sorted_order() {
    let rows = RowAccessor::new(ScriptedClient::with_cells(&[
        ("b2", "second-b"),
        ("a1", "first-a"),
        ("b1", "first-b"),
    ]));

    let value = rows
        .get_cell_by_first_byte(TABLE, b"u1", b'b', TIMEOUT)
        .expect("tag b");
    assert_eq!(&value[..], b"second-b");
}

#[test]
fn name_lookup_returns_first_exact_match() {
    let rows = RowAccessor::new(ScriptedClient::with_cells(&[
        ("nickname", "al"),
        ("name", "alice"),
    ]));
    let value = rows
        .get_cell_by_name(TABLE, b"u1", "name", TIMEOUT)
        .expect("name");
    assert_eq!(&value[..], b"alice");
}

#[test]
fn empty_qualifier_never_matches_a_tag() {
    let rows = RowAccessor::new(ScriptedClient::with_cells(&[("", "blank")]));
    let err = rows
        .get_cell_by_first_byte(TABLE, b"u1", 0, TIMEOUT)
        .expect_err("blank qualifier");
    assert!(err.is_data_corrupt());
}

#[test]
fn read_errors_pass_through_unchanged() {
    let unavailable = ClientError::Unavailable {
        message: "region offline".to_string(),
    };
    let rows = RowAccessor::new(ScriptedClient::replying(Err(unavailable.clone())));
    let err = rows.get_row(TABLE, b"u1", TIMEOUT).expect_err("offline");
    assert_eq!(err, RowError::Client(unavailable));
}

#[test]
fn write_errors_pass_through_unchanged() {
    let client = ScriptedClient::default();
    *client.put_error.lock().unwrap() = Some(ClientError::DeadlineExceeded);
    let rows = RowAccessor::new(client);

    let err = rows
        .delete_row(TABLE, b"u1", TIMEOUT)
        .expect_err("deadline");
    assert_eq!(err, RowError::Client(ClientError::DeadlineExceeded));
}

#[test]
fn put_cell_shapes_single_family_mutation() {
    let rows = RowAccessor::new(ScriptedClient::default());
    rows.put_cell(TABLE, b"u1", "name", b"alice", TIMEOUT)
        .expect("put");

    let mutations = rows.client().mutations.lock().unwrap();
    assert_eq!(mutations.len(), 1);
    assert_eq!(&mutations[0].table()[..], TABLE);
    assert_eq!(&mutations[0].key()[..], b"u1");
    let Mutation::Put(values) = mutations[0].mutation() else {
        panic!("expected a put");
    };
    assert_eq!(values.keys().collect::<Vec<_>>(), vec![FAMILY]);
    assert_eq!(&values[FAMILY]["name"][..], b"alice");
}

#[test]
fn deletes_target_family_or_single_column() {
    let rows = RowAccessor::new(ScriptedClient::default());
    rows.delete_row(TABLE, b"u1", TIMEOUT).expect("delete row");
    rows.delete_cell(TABLE, b"u1", "age", TIMEOUT)
        .expect("delete cell");

    let mutations = rows.client().mutations.lock().unwrap();
    let scopes: Vec<&ColumnDelete> = mutations
        .iter()
        .map(|req| match req.mutation() {
            Mutation::Delete(deletes) => &deletes[FAMILY],
            Mutation::Put(_) => panic!("expected deletes only"),
        })
        .collect();
    assert_eq!(scopes[0], &ColumnDelete::Family);
    assert_eq!(
        scopes[1],
        &ColumnDelete::Columns(BTreeSet::from(["age".to_string()]))
    );
}

#[test]
fn invalid_request_never_reaches_client() {
    let rows = RowAccessor::new(ScriptedClient::default());
    let err = rows
        .put_cell(TABLE, b"", "name", b"alice", TIMEOUT)
        .expect_err("empty key");
    assert!(matches!(
        err,
        RowError::Client(ClientError::InvalidRequest { .. })
    ));
    assert!(rows.client().mutations.lock().unwrap().is_empty());
    assert!(rows.client().tokens.lock().unwrap().is_empty());
}

#[test]
fn every_call_releases_its_scope() {
    let rows = RowAccessor::new(ScriptedClient::with_cells(&[("name", "alice")]));
    rows.put_cell(TABLE, b"u1", "name", b"alice", TIMEOUT)
        .expect("put");
    rows.get_cell_by_name(TABLE, b"u1", "name", TIMEOUT)
        .expect("get");
    let _ = rows.get_cell_by_name(TABLE, b"u1", "missing", TIMEOUT);

    let tokens = rows.client().tokens.lock().unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(CancelToken::is_cancelled));
}

#[test]
fn scan_rows_drops_empty_rows() {
    let client = ScriptedClient::default();
    *client.scan_reply.lock().unwrap() = vec![
        RowResult::new("a", vec![Cell::new(FAMILY, "v", "1")]),
        RowResult::new("b", Vec::new()),
        RowResult::new("c", vec![Cell::new(FAMILY, "v", "3")]),
    ];
    let rows = RowAccessor::new(client);

    let found = rows
        .scan_rows(ScanRequest::new(TABLE).expect("scan"), TIMEOUT)
        .expect("scan rows");
    let keys: Vec<&[u8]> = found.iter().map(|row| row.key.as_ref()).collect();
    assert_eq!(keys, vec![&b"a"[..], &b"c"[..]]);
}
