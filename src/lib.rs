//! Facade crate for geofence synchronisation.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! and HTTP transport behind feature flags.

#![forbid(unsafe_code)]

pub use geofence_core::{
    ApiRequest, ApiResponse, ClientConfig, CrossingEvent, CrossingType, EventSink, GeofenceClient,
    GeofenceError, GeofenceRecord, GeofenceStore, HttpMethod, LogSink, MemoryGeofenceStore,
    ReconciliationResult, StoreError, Transport, TransportError, UNSPECIFIED_RADIUS, codec,
    reconcile,
};

#[cfg(feature = "store-sqlite")]
pub use geofence_core::SqliteGeofenceStore;

#[cfg(feature = "http")]
pub use geofence_http::{
    BuildError, HttpTransport, HttpTransportConfig, SlackNotifier, SlackNotifierConfig,
};

#[cfg(feature = "test-support")]
pub use geofence_core::test_support;
