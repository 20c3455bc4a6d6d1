//! Geofence synchronisation core.
//!
//! The crate keeps a device-local set of circular geofences in step with the
//! config connector service. It provides the record model, the GeoJSON codec,
//! a full-replace reconciler, pure request builders and a
//! [`GeofenceClient`] that ties them to a [`Transport`] and a
//! [`GeofenceStore`].
//!
//! Network I/O lives behind the [`Transport`] trait; the `geofence-http`
//! crate provides a reqwest implementation.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
pub mod codec;
mod error;
mod event;
mod reconcile;
mod record;
mod request;
mod sink;
mod store;
mod transport;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use client::{ClientConfig, GeofenceClient};
pub use error::{GeofenceError, StoreError, TransportError};
pub use event::{CrossingEvent, CrossingType, ParseCrossingTypeError};
pub use reconcile::{ReconciliationResult, reconcile};
pub use record::{GeofenceRecord, UNSPECIFIED_RADIUS};
pub use request::{
    ApiRequest, ApiResponse, CrossingReport, DEFAULT_NOTIFICATION_PATH, GEOFENCES_PATH,
    HttpMethod, build_create_request, build_crossing_report_request,
    build_crossing_report_request_at, build_delete_request, build_list_request,
    build_update_request, build_update_request_at, parse_create_response,
};
pub use sink::{EventSink, LogSink};
#[cfg(feature = "store-sqlite")]
pub use store::SqliteGeofenceStore;
pub use store::{GeofenceStore, MemoryGeofenceStore};
pub use transport::Transport;
