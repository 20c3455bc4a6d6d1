//! Observers notified when crossings are detected and snapshots applied.

use std::sync::Arc;

use log::info;

use crate::{CrossingEvent, ReconciliationResult};

/// Receives notifications from a [`GeofenceClient`](crate::GeofenceClient).
///
/// Sinks cannot fail the operation that notified them; implementations log
/// their own delivery errors.
pub trait EventSink: Send + Sync {
    /// Crossings were detected. Called before the batch is posted upstream.
    fn crossing_detected(&self, events: &[CrossingEvent]);

    /// A snapshot was reconciled into the local store.
    fn geofences_synced(&self, _result: &ReconciliationResult) {}
}

/// Sink that writes a line per notification to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn crossing_detected(&self, events: &[CrossingEvent]) {
        for event in events {
            info!(
                "{} {} geofence {:?} ({:?})",
                event.device_descriptor, event.crossing_type, event.fence_name, event.fence_code
            );
        }
    }

    fn geofences_synced(&self, result: &ReconciliationResult) {
        info!(
            "synced {} geofence(s); removed {:?}",
            result.total_count, result.deleted_codes
        );
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn crossing_detected(&self, events: &[CrossingEvent]) {
        (**self).crossing_detected(events);
    }

    fn geofences_synced(&self, result: &ReconciliationResult) {
        (**self).geofences_synced(result);
    }
}
