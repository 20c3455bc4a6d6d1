//! Behavioural tests for [`GeofenceClient`] using [`StubTransport`].

use geofence_core::test_support::{RecordingSink, StubTransport};
use geofence_core::{
    ApiResponse, ClientConfig, CrossingType, GeofenceClient, GeofenceError, GeofenceRecord,
    GeofenceStore, HttpMethod, MemoryGeofenceStore, TransportError,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use std::cell::RefCell;
use std::sync::Arc;

type OutcomeCell = RefCell<Option<Result<(), GeofenceError>>>;
type Client = GeofenceClient<MemoryGeofenceStore, Arc<StubTransport>>;

fn fence_a() -> GeofenceRecord {
    GeofenceRecord::new(Some("A".into()), "Home", 20.0, 10.0, 50.0)
}

#[fixture]
fn store() -> RefCell<MemoryGeofenceStore> {
    RefCell::new(MemoryGeofenceStore::default())
}

#[fixture]
fn transport() -> Arc<StubTransport> {
    Arc::new(StubTransport::default())
}

#[fixture]
fn sink() -> Arc<RecordingSink> {
    Arc::new(RecordingSink::default())
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

/// Run `operation` against a client built from the scenario fixtures and put
/// the store back afterwards.
fn with_client<F>(
    store: &RefCell<MemoryGeofenceStore>,
    transport: &Arc<StubTransport>,
    sink: &Arc<RecordingSink>,
    operation: F,
) -> Result<(), GeofenceError>
where
    F: FnOnce(&Client) -> Result<(), GeofenceError>,
{
    let client = GeofenceClient::new(
        store.take(),
        Arc::clone(transport),
        ClientConfig::new("alice", "device-1").with_sdk_version("1.0.1"),
    )
    .with_sink(Arc::clone(sink));
    let outcome = operation(&client);
    *store.borrow_mut() = client.into_store();
    outcome
}

// --- Given steps ---

#[given("an empty local store")]
fn empty_store(#[from(store)] store: &RefCell<MemoryGeofenceStore>) {
    *store.borrow_mut() = MemoryGeofenceStore::default();
}

#[given("a local store holding fence A")]
fn store_with_a(#[from(store)] store: &RefCell<MemoryGeofenceStore>) {
    *store.borrow_mut() = MemoryGeofenceStore::with_records([fence_a()]);
}

#[given("a server that assigns code X1")]
fn server_assigns_code(#[from(transport)] transport: &Arc<StubTransport>) {
    transport.respond(ApiResponse::new(201, json!({"@code": "X1"}).to_string()));
}

#[given("a server failing with HTTP 500")]
fn server_fails(#[from(transport)] transport: &Arc<StubTransport>) {
    transport.fail(TransportError::Http {
        url: "http://localhost:3000/geofences/A".to_owned(),
        status: 500,
        message: "internal error".to_owned(),
    });
}

#[given("a server serving a snapshot with fence B")]
fn server_serves_snapshot(#[from(transport)] transport: &Arc<StubTransport>) {
    let body = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"@code": "B", "name": "Work", "description": "", "radius": 75.0},
            "geometry": {"type": "Point", "coordinates": [-0.1, 51.5]}
        }]
    });
    transport.respond(ApiResponse::new(200, body.to_string()));
}

#[given("an unreachable server")]
fn server_unreachable(#[from(transport)] transport: &Arc<StubTransport>) {
    transport.fail(TransportError::Network {
        url: "http://localhost:3000/events".to_owned(),
        message: "connection refused".to_owned(),
    });
}

// --- When steps ---

#[when("I register a fence named Home")]
fn register_home(
    #[from(store)] store: &RefCell<MemoryGeofenceStore>,
    #[from(transport)] transport: &Arc<StubTransport>,
    #[from(sink)] sink: &Arc<RecordingSink>,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    *outcome.borrow_mut() = Some(with_client(store, transport, sink, |client| {
        client
            .register(&GeofenceRecord::draft("Home", 20.0, 10.0, 50.0))
            .map(|_| ())
    }));
}

#[when("I move fence A")]
fn move_a(
    #[from(store)] store: &RefCell<MemoryGeofenceStore>,
    #[from(transport)] transport: &Arc<StubTransport>,
    #[from(sink)] sink: &Arc<RecordingSink>,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    let moved = GeofenceRecord::new(Some("A".into()), "Home", 21.0, 11.0, 50.0);
    *outcome.borrow_mut() = Some(with_client(store, transport, sink, |client| {
        client.update(&moved)
    }));
}

#[when("I sync")]
fn sync(
    #[from(store)] store: &RefCell<MemoryGeofenceStore>,
    #[from(transport)] transport: &Arc<StubTransport>,
    #[from(sink)] sink: &Arc<RecordingSink>,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    *outcome.borrow_mut() = Some(with_client(store, transport, sink, |client| {
        client.sync().map(|_| ())
    }));
}

#[when("I report entering fence A")]
fn report_enter(
    #[from(store)] store: &RefCell<MemoryGeofenceStore>,
    #[from(transport)] transport: &Arc<StubTransport>,
    #[from(sink)] sink: &Arc<RecordingSink>,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    *outcome.borrow_mut() = Some(with_client(store, transport, sink, |client| {
        client
            .report_crossing(&[fence_a()], CrossingType::Enter)
            .map(|_| ())
    }));
}

// --- Then steps ---

#[then("the store holds fence X1 named Home")]
fn then_registered(
    #[from(store)] store: &RefCell<MemoryGeofenceStore>,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    assert!(
        matches!(outcome.borrow().as_ref(), Some(Ok(()))),
        "expected success, got {:?}",
        outcome.borrow()
    );
    let stored = store
        .borrow()
        .find_by_code("X1")
        .expect("lookup")
        .expect("X1 is stored");
    assert_eq!(stored.name.as_deref(), Some("Home"));
}

#[then("one POST to geofences was sent")]
fn then_one_post(#[from(transport)] transport: &Arc<StubTransport>) {
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("one request");
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "geofences");
}

#[then("a transport error with status 500 is returned")]
fn then_http_500(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref() {
        Some(Err(GeofenceError::Transport(err))) => assert_eq!(err.status(), Some(500)),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[then("fence A is unchanged in the store")]
fn then_a_unchanged(#[from(store)] store: &RefCell<MemoryGeofenceStore>) {
    assert_eq!(store.borrow().list_all().expect("list"), [fence_a()]);
}

#[then("the store holds only fence B")]
fn then_only_b(#[from(store)] store: &RefCell<MemoryGeofenceStore>) {
    let records = store.borrow().list_all().expect("list");
    let codes: Vec<_> = records.iter().filter_map(|r| r.code.as_deref()).collect();
    assert_eq!(codes, ["B"]);
}

#[then("the sink saw one sync")]
fn then_one_sync(#[from(sink)] sink: &Arc<RecordingSink>) {
    let syncs = sink.syncs();
    assert_eq!(syncs.len(), 1);
    assert_eq!(
        syncs.first().map(|s| s.deleted_codes.clone()),
        Some(vec!["A".to_owned()])
    );
}

#[then("a network error is returned")]
fn then_network_error(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    assert!(
        matches!(
            borrowed.as_ref(),
            Some(Err(GeofenceError::Transport(TransportError::Network { .. })))
        ),
        "expected network error, got {borrowed:?}"
    );
}

#[then("the sink saw one crossing")]
fn then_one_crossing(#[from(sink)] sink: &Arc<RecordingSink>) {
    let crossings = sink.crossings();
    assert_eq!(crossings.len(), 1);
    let event = crossings.first().expect("one event");
    assert_eq!(event.fence_code.as_deref(), Some("A"));
    assert_eq!(event.crossing_type, CrossingType::Enter);
}

#[then("one request was sent without retry")]
fn then_no_retry(#[from(transport)] transport: &Arc<StubTransport>) {
    assert_eq!(transport.requests().len(), 1);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/client.feature", name = $title)]
        fn $fn_name(
            store: RefCell<MemoryGeofenceStore>,
            transport: Arc<StubTransport>,
            sink: Arc<RecordingSink>,
            outcome: OutcomeCell,
        ) {
            let _ = (store, transport, sink, outcome);
        }
    };
}

register_scenario!(
    registering_stores_code,
    "registering a fence stores the assigned code"
);
register_scenario!(
    failed_update_leaves_store,
    "a failed update leaves the store untouched"
);
register_scenario!(
    syncing_replaces_local_set,
    "syncing replaces the local set with the snapshot"
);
register_scenario!(
    reporting_while_offline,
    "reporting a crossing while offline"
);
