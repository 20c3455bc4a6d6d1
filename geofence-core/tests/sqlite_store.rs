//! Integration tests for the SQLite-backed store.
#![cfg(feature = "store-sqlite")]

use geofence_core::{GeofenceRecord, GeofenceStore, SqliteGeofenceStore, StoreError, reconcile};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().expect("temporary directory should be created")
}

#[rstest]
fn records_survive_reopening(workdir: TempDir) {
    let path = workdir.path().join("geofences.db");
    let home = GeofenceRecord::new(Some("A".into()), "Home", 20.0, 10.0, 50.0)
        .with_description("front door");
    {
        let mut store = SqliteGeofenceStore::open(&path).expect("open database");
        store.save(&home).expect("save");
    }

    let store = SqliteGeofenceStore::open(&path).expect("reopen database");
    assert_eq!(store.list_all().expect("list"), [home]);
}

#[rstest]
fn reconcile_mirrors_snapshot_on_disk(workdir: TempDir) {
    let path = workdir.path().join("geofences.db");
    let mut store = SqliteGeofenceStore::open(&path).expect("open database");
    for (code, name) in [("A", "Old"), ("B", "Gone")] {
        store
            .save(&GeofenceRecord::new(Some(code.into()), name, 0.0, 0.0, 10.0))
            .expect("save");
    }
    let snapshot = vec![
        GeofenceRecord::new(Some("A".into()), "Home", 20.0, 10.0, 50.0),
        GeofenceRecord::new(Some("C".into()), "New", 1.0, 2.0, 5.0),
    ];

    let result = reconcile(snapshot.clone(), &mut store).expect("reconcile");

    assert_eq!(result.deleted_codes, ["B"]);
    assert_eq!(store.list_all().expect("list"), snapshot);
}

#[rstest]
fn open_failure_reports_the_path(workdir: TempDir) {
    let missing = workdir.path().join("missing").join("geofences.db");
    let err = SqliteGeofenceStore::open(&missing).expect_err("parent directory does not exist");
    match err {
        StoreError::OpenDatabase { path, .. } => assert_eq!(path, missing),
        other => panic!("expected OpenDatabase, got {other:?}"),
    }
}
