//! Full-replace reconciliation of the local store against a server snapshot.

use std::collections::{HashMap, HashSet};

use log::{debug, error};
use serde::Serialize;

use crate::{GeofenceError, GeofenceRecord, GeofenceStore};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Snapshot records after merging, in snapshot order.
    pub updated_or_created: Vec<GeofenceRecord>,
    /// Number of records in the snapshot.
    pub total_count: usize,
    /// Codes that were stored locally but absent from the snapshot.
    pub deleted_codes: Vec<String>,
}

/// Make `store` mirror `snapshot`.
///
/// Each snapshot record whose code is already stored updates that record in
/// place; the others are created. Stored records whose code is absent from the
/// snapshot are deleted. Every call must pass the complete snapshot.
///
/// Validation happens before the store is touched: a stored record without a
/// code fails with [`GeofenceError::InvalidLocalState`] and a snapshot record
/// without a code fails with [`GeofenceError::MalformedPayload`]. The writes
/// go through [`GeofenceStore::apply`], so a store failure leaves the store
/// unchanged.
///
/// # Examples
/// ```
/// use geofence_core::{GeofenceRecord, GeofenceStore, MemoryGeofenceStore, reconcile};
///
/// let mut store = MemoryGeofenceStore::with_records([
///     GeofenceRecord::new(Some("A".into()), "Old", 0.0, 0.0, 10.0),
///     GeofenceRecord::new(Some("B".into()), "Gone", 0.0, 0.0, 5.0),
/// ]);
/// let snapshot = vec![GeofenceRecord::new(Some("A".into()), "Home", 20.0, 10.0, 50.0)];
///
/// let result = reconcile(snapshot, &mut store)?;
/// assert_eq!(result.deleted_codes, ["B"]);
/// assert_eq!(result.total_count, 1);
/// assert_eq!(store.list_all()?.len(), 1);
/// # Ok::<(), geofence_core::GeofenceError>(())
/// ```
pub fn reconcile<S>(
    snapshot: Vec<GeofenceRecord>,
    store: &mut S,
) -> Result<ReconciliationResult, GeofenceError>
where
    S: GeofenceStore + ?Sized,
{
    let local = store.list_all()?;
    let local_by_code = index_local(local)?;
    ensure_snapshot_codes(&snapshot)?;

    let mut matched = HashSet::new();
    let mut updated_or_created = Vec::with_capacity(snapshot.len());
    for remote in snapshot {
        let merged = match stored_copy(&local_by_code, &remote) {
            Some(mut existing) => {
                existing.apply_update(&remote);
                existing
            }
            None => remote,
        };
        if let Some(code) = &merged.code {
            matched.insert(code.clone());
        }
        updated_or_created.push(merged);
    }

    let mut local_only: Vec<(usize, String)> = local_by_code
        .into_iter()
        .filter(|(code, _)| !matched.contains(code))
        .map(|(code, (position, _))| (position, code))
        .collect();
    local_only.sort_unstable();

    let deleted_codes: Vec<String> = local_only.into_iter().map(|(_, code)| code).collect();
    store.apply(&updated_or_created, &deleted_codes)?;

    debug!(
        "reconciled {} geofence(s); deleted {} from local store",
        updated_or_created.len(),
        deleted_codes.len()
    );
    Ok(ReconciliationResult {
        total_count: updated_or_created.len(),
        updated_or_created,
        deleted_codes,
    })
}

type LocalIndex = HashMap<String, (usize, GeofenceRecord)>;

fn index_local(local: Vec<GeofenceRecord>) -> Result<LocalIndex, GeofenceError> {
    let mut index = HashMap::with_capacity(local.len());
    for (position, record) in local.into_iter().enumerate() {
        let Some(code) = record.code.clone() else {
            error!(
                "local geofence {:?} has no code; aborting reconciliation",
                record.name
            );
            return Err(GeofenceError::InvalidLocalState { name: record.name });
        };
        index.insert(code, (position, record));
    }
    Ok(index)
}

fn ensure_snapshot_codes(snapshot: &[GeofenceRecord]) -> Result<(), GeofenceError> {
    if let Some((index, record)) = snapshot
        .iter()
        .enumerate()
        .find(|(_, record)| record.code.is_none())
    {
        error!("snapshot geofence {index} ({:?}) has no code", record.name);
        return Err(GeofenceError::malformed(format!(
            "snapshot feature {index} has no code"
        )));
    }
    Ok(())
}

fn stored_copy(local: &LocalIndex, remote: &GeofenceRecord) -> Option<GeofenceRecord> {
    let code = remote.code.as_deref()?;
    local.get(code).map(|(_, existing)| existing.clone())
}
