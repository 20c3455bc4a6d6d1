//! SQLite-backed geofence store.

use std::{fmt, path::Path};

use geo::Coord;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{GeofenceRecord, StoreError};

use super::GeofenceStore;

const CREATE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS geofences (
    code        TEXT PRIMARY KEY NOT NULL,
    name        TEXT,
    description TEXT,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    radius      REAL NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT code, name, description, latitude, longitude, radius FROM geofences";

/// Persistent store keyed by geofence code.
///
/// Only registered fences are persisted; saving a record without a code
/// fails with [`StoreError::MissingCode`]. `list_all` orders rows by code.
pub struct SqliteGeofenceStore {
    connection: Connection,
}

impl fmt::Debug for SqliteGeofenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteGeofenceStore")
            .field("path", &self.connection.path())
            .finish_non_exhaustive()
    }
}

impl SqliteGeofenceStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(|source| StoreError::OpenDatabase {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self, StoreError> {
        connection.execute(CREATE_SCHEMA, [])?;
        Ok(Self { connection })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<GeofenceRecord> {
    let latitude: f64 = row.get(3)?;
    let longitude: f64 = row.get(4)?;
    Ok(GeofenceRecord {
        code: Some(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        center: Coord {
            x: longitude,
            y: latitude,
        },
        radius: row.get(5)?,
    })
}

impl GeofenceStore for SqliteGeofenceStore {
    fn list_all(&self) -> Result<Vec<GeofenceRecord>, StoreError> {
        let mut statement = self
            .connection
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY code"))?;
        let records = statement
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<GeofenceRecord>, StoreError> {
        let record = self
            .connection
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE code = ?1"),
                params![code],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn save(&mut self, record: &GeofenceRecord) -> Result<(), StoreError> {
        upsert(&self.connection, record)
    }

    fn delete(&mut self, code: &str) -> Result<bool, StoreError> {
        delete_row(&self.connection, code)
    }

    fn apply(&mut self, saves: &[GeofenceRecord], deletes: &[String]) -> Result<(), StoreError> {
        let transaction = self.connection.transaction()?;
        for record in saves {
            upsert(&transaction, record)?;
        }
        for code in deletes {
            delete_row(&transaction, code)?;
        }
        transaction.commit()?;
        Ok(())
    }
}

fn upsert(connection: &Connection, record: &GeofenceRecord) -> Result<(), StoreError> {
    let Some(code) = record.code.as_deref() else {
        return Err(StoreError::MissingCode {
            name: record.name.clone(),
        });
    };
    connection.execute(
        "INSERT INTO geofences (code, name, description, latitude, longitude, radius)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(code) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            radius = excluded.radius",
        params![
            code,
            record.name,
            record.description,
            record.latitude(),
            record.longitude(),
            record.radius,
        ],
    )?;
    Ok(())
}

fn delete_row(connection: &Connection, code: &str) -> Result<bool, StoreError> {
    let removed = connection.execute("DELETE FROM geofences WHERE code = ?1", params![code])?;
    Ok(removed > 0)
}
