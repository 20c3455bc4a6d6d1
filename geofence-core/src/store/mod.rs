//! Local persistence for geofences.
//!
//! The `GeofenceStore` trait is the handle the reconciler and client mutate.
//! It is passed explicitly so reconciliation can run against an in-memory
//! store in tests and against SQLite on a device.

use crate::{GeofenceRecord, StoreError};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryGeofenceStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteGeofenceStore;

/// Read/write access to the locally known geofences.
///
/// Records are keyed by `code`. Implementations may refuse to persist
/// records without a code by returning [`StoreError::MissingCode`].
///
/// # Examples
///
/// ```rust
/// use geofence_core::{GeofenceRecord, GeofenceStore, MemoryGeofenceStore};
///
/// let mut store = MemoryGeofenceStore::default();
/// store.save(&GeofenceRecord::new(Some("A".into()), "Home", 1.0, 2.0, 50.0))?;
///
/// assert!(store.find_by_code("A")?.is_some());
/// assert!(store.delete("A")?);
/// assert!(store.list_all()?.is_empty());
/// # Ok::<(), geofence_core::StoreError>(())
/// ```
pub trait GeofenceStore {
    /// Return every stored record.
    fn list_all(&self) -> Result<Vec<GeofenceRecord>, StoreError>;

    /// Look up the record with the given code.
    fn find_by_code(&self, code: &str) -> Result<Option<GeofenceRecord>, StoreError>;

    /// Insert `record`, replacing any stored record with the same code.
    fn save(&mut self, record: &GeofenceRecord) -> Result<(), StoreError>;

    /// Remove the record with the given code, reporting whether one existed.
    fn delete(&mut self, code: &str) -> Result<bool, StoreError>;

    /// Save every record in `saves`, then delete every code in `deletes`, as
    /// one unit: on error the store is left exactly as it was.
    fn apply(&mut self, saves: &[GeofenceRecord], deletes: &[String]) -> Result<(), StoreError>;
}

impl<S: GeofenceStore + ?Sized> GeofenceStore for Box<S> {
    fn list_all(&self) -> Result<Vec<GeofenceRecord>, StoreError> {
        (**self).list_all()
    }

    fn find_by_code(&self, code: &str) -> Result<Option<GeofenceRecord>, StoreError> {
        (**self).find_by_code(code)
    }

    fn save(&mut self, record: &GeofenceRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }

    fn delete(&mut self, code: &str) -> Result<bool, StoreError> {
        (**self).delete(code)
    }

    fn apply(&mut self, saves: &[GeofenceRecord], deletes: &[String]) -> Result<(), StoreError> {
        (**self).apply(saves, deletes)
    }
}
