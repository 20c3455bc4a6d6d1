//! Test helpers: a scripted client factory and a temporary SQLite store.

use std::sync::Arc;

use camino::Utf8PathBuf;
use geofence_core::test_support::StubTransport;
use geofence_core::{
    ClientConfig, GeofenceClient, GeofenceRecord, GeofenceStore, SqliteGeofenceStore, Transport,
};
use serde_json::Value;
use tempfile::TempDir;

use crate::connection::{CliClient, ClientFactory, ConnectionConfig, open_store};
use crate::CliError;

/// Connects commands to a [`StubTransport`] and the configured SQLite file.
pub(super) struct StubFactory {
    pub(super) transport: Arc<StubTransport>,
}

impl StubFactory {
    pub(super) fn new() -> Self {
        Self {
            transport: Arc::new(StubTransport::default()),
        }
    }
}

impl ClientFactory for StubFactory {
    fn connect(
        &self,
        config: &ConnectionConfig,
        client: ClientConfig,
    ) -> Result<CliClient, CliError> {
        let store = open_store(&config.database)?;
        Ok(GeofenceClient::new(
            Box::new(store) as Box<dyn GeofenceStore + Send>,
            Box::new(Arc::clone(&self.transport)) as Box<dyn Transport>,
            client,
        ))
    }
}

/// Temporary directory holding the local store and snapshot files.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("geofences.db")
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::from_options(
            None,
            Some("alice".to_owned()),
            Some("secret".to_owned()),
            Some(self.database()),
        )
    }

    pub(super) fn seed(&self, records: &[GeofenceRecord]) {
        let mut store = SqliteGeofenceStore::open(self.database().as_std_path()).expect("open store");
        for record in records {
            store.save(record).expect("seed record");
        }
    }

    pub(super) fn stored(&self) -> Vec<GeofenceRecord> {
        SqliteGeofenceStore::open(self.database().as_std_path())
            .expect("open store")
            .list_all()
            .expect("list records")
    }
}

pub(super) fn home() -> GeofenceRecord {
    GeofenceRecord::new(Some("A".into()), "Home", 20.0, 10.0, 50.0).with_description("front door")
}

pub(super) fn work() -> GeofenceRecord {
    GeofenceRecord::new(Some("B".into()), "Work", 51.5, -0.1, 75.0)
}

pub(super) fn output_json(buffer: &[u8]) -> Value {
    serde_json::from_slice(buffer).expect("command output is JSON")
}
