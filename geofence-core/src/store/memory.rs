//! In-memory geofence store.

use crate::{GeofenceRecord, StoreError};

use super::GeofenceStore;

/// Insertion-ordered in-memory store.
///
/// Unlike persistent stores it accepts records without a code, appending them
/// as drafts; the reconciler rejects such state with
/// [`GeofenceError::InvalidLocalState`](crate::GeofenceError::InvalidLocalState).
#[derive(Debug, Default, Clone)]
pub struct MemoryGeofenceStore {
    records: Vec<GeofenceRecord>,
}

impl MemoryGeofenceStore {
    /// Create a store from existing records, keeping their order.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = GeofenceRecord>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.code.as_deref() == Some(code))
    }
}

impl GeofenceStore for MemoryGeofenceStore {
    fn list_all(&self) -> Result<Vec<GeofenceRecord>, StoreError> {
        Ok(self.records.clone())
    }

    fn find_by_code(&self, code: &str) -> Result<Option<GeofenceRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .find(|record| record.code.as_deref() == Some(code))
            .cloned())
    }

    fn save(&mut self, record: &GeofenceRecord) -> Result<(), StoreError> {
        let existing = record.code.as_deref().and_then(|code| self.position(code));
        match existing.and_then(|index| self.records.get_mut(index)) {
            Some(slot) => slot.clone_from(record),
            None => self.records.push(record.clone()),
        }
        Ok(())
    }

    fn delete(&mut self, code: &str) -> Result<bool, StoreError> {
        let before = self.records.len();
        self.records
            .retain(|record| record.code.as_deref() != Some(code));
        Ok(self.records.len() != before)
    }

    fn apply(&mut self, saves: &[GeofenceRecord], deletes: &[String]) -> Result<(), StoreError> {
        let mut staged = self.clone();
        for record in saves {
            staged.save(record)?;
        }
        for code in deletes {
            staged.delete(code)?;
        }
        *self = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn save_replaces_by_code_in_place() {
        let mut store = MemoryGeofenceStore::with_records([
            GeofenceRecord::new(Some("A".into()), "Old", 0.0, 0.0, 1.0),
            GeofenceRecord::new(Some("B".into()), "Other", 0.0, 0.0, 1.0),
        ]);
        store
            .save(&GeofenceRecord::new(Some("A".into()), "New", 1.0, 1.0, 2.0))
            .expect("save");
        let names: Vec<_> = store
            .list_all()
            .expect("list")
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, ["New", "Other"]);
    }

    #[rstest]
    fn drafts_are_appended() {
        let mut store = MemoryGeofenceStore::default();
        let draft = GeofenceRecord::draft("Draft", 0.0, 0.0, 1.0);
        store.save(&draft).expect("save");
        store.save(&draft).expect("save");
        assert_eq!(store.len(), 2);
    }

    #[rstest]
    fn apply_saves_then_deletes() {
        let mut store = MemoryGeofenceStore::with_records([
            GeofenceRecord::new(Some("A".into()), "Old", 0.0, 0.0, 1.0),
            GeofenceRecord::new(Some("B".into()), "Gone", 0.0, 0.0, 1.0),
        ]);
        store
            .apply(
                &[
                    GeofenceRecord::new(Some("A".into()), "Home", 0.0, 0.0, 1.0),
                    GeofenceRecord::new(Some("C".into()), "New", 0.0, 0.0, 1.0),
                ],
                &["B".to_owned()],
            )
            .expect("apply");
        let names: Vec<_> = store
            .list_all()
            .expect("list")
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, ["Home", "New"]);
    }

    #[rstest]
    fn delete_reports_missing_code() {
        let mut store = MemoryGeofenceStore::default();
        assert!(!store.delete("nope").expect("delete"));
        assert!(store.is_empty());
    }
}
