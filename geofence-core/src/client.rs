//! Orchestration of register, update, unregister, sync and crossing reports.
//!
//! [`GeofenceClient`] pairs a [`Transport`] with a [`GeofenceStore`]. Network
//! calls run outside any lock; every local-store mutation happens inside a
//! single `Mutex` critical section so concurrent calls never lose updates.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error};

use crate::codec::decode_geofences;
use crate::request::{
    CrossingReport, DEFAULT_NOTIFICATION_PATH, build_create_request, build_crossing_report_request,
    build_delete_request, build_list_request, build_update_request, parse_create_response,
};
use crate::{
    ApiRequest, ApiResponse, CrossingEvent, CrossingType, EventSink, GeofenceError,
    GeofenceRecord, GeofenceStore, ReconciliationResult, Transport, reconcile,
};

/// Identity and endpoint settings for a [`GeofenceClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// User recorded in the `@updated` stamp of updates.
    pub acting_user: String,
    /// Stable per-install device identifier sent with crossing reports.
    pub descriptor: String,
    /// SDK version sent with crossing reports.
    pub sdk_version: String,
    /// Path crossing reports are posted to.
    pub notification_path: String,
}

impl ClientConfig {
    /// Configuration with the crate version and the default notification path.
    #[must_use]
    pub fn new(acting_user: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            acting_user: acting_user.into(),
            descriptor: descriptor.into(),
            sdk_version: env!("CARGO_PKG_VERSION").to_owned(),
            notification_path: DEFAULT_NOTIFICATION_PATH.to_owned(),
        }
    }

    /// Override the reported SDK version.
    #[must_use]
    pub fn with_sdk_version(mut self, sdk_version: impl Into<String>) -> Self {
        self.sdk_version = sdk_version.into();
        self
    }

    /// Override the crossing report path.
    #[must_use]
    pub fn with_notification_path(mut self, path: impl Into<String>) -> Self {
        self.notification_path = path.into();
        self
    }
}

/// Keeps a local geofence store in step with the config connector.
///
/// Every operation returns exactly one `Result`. Transport failures are
/// logged and returned unchanged; nothing is retried.
///
/// # Examples
///
/// ```rust
/// use geofence_core::test_support::StubTransport;
/// use geofence_core::{ApiResponse, ClientConfig, GeofenceClient, GeofenceRecord, MemoryGeofenceStore};
///
/// let transport = StubTransport::default();
/// transport.respond(ApiResponse::new(201, r#"{"@code":"X1"}"#));
/// let client = GeofenceClient::new(
///     MemoryGeofenceStore::default(),
///     transport,
///     ClientConfig::new("alice", "device-1"),
/// );
///
/// let registered = client.register(&GeofenceRecord::draft("Home", 20.0, 10.0, 50.0))?;
/// assert_eq!(registered.code.as_deref(), Some("X1"));
/// assert_eq!(client.stored()?.len(), 1);
/// # Ok::<(), geofence_core::GeofenceError>(())
/// ```
pub struct GeofenceClient<S, T> {
    store: Mutex<S>,
    transport: T,
    config: ClientConfig,
    sinks: Vec<Box<dyn EventSink>>,
}

impl<S, T> std::fmt::Debug for GeofenceClient<S, T>
where
    S: std::fmt::Debug,
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceClient")
            .field("store", &self.store)
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<S, T> GeofenceClient<S, T>
where
    S: GeofenceStore,
    T: Transport,
{
    /// Build a client without sinks.
    #[must_use]
    pub const fn new(store: S, transport: T, config: ClientConfig) -> Self {
        Self {
            store: Mutex::new(store),
            transport,
            config,
            sinks: Vec::new(),
        }
    }

    /// Register an additional sink.
    #[must_use]
    pub fn with_sink<E: EventSink + 'static>(mut self, sink: E) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the client and return its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the locally stored geofences.
    pub fn stored(&self) -> Result<Vec<GeofenceRecord>, GeofenceError> {
        Ok(self.lock_store().list_all()?)
    }

    /// Look up a locally stored geofence by code.
    pub fn find(&self, code: &str) -> Result<Option<GeofenceRecord>, GeofenceError> {
        Ok(self.lock_store().find_by_code(code)?)
    }

    /// Create `record` on the server and persist it with its assigned code.
    pub fn register(&self, record: &GeofenceRecord) -> Result<GeofenceRecord, GeofenceError> {
        let request = build_create_request(record)?;
        let response = self.execute(&request)?;
        let code = parse_create_response(&response.json()?)?;
        let registered = record.clone().with_code(code);
        self.lock_store().save(&registered)?;
        Ok(registered)
    }

    /// Replace `record` on the server and persist the change.
    pub fn update(&self, record: &GeofenceRecord) -> Result<(), GeofenceError> {
        let request = build_update_request(record, &self.config.acting_user)?;
        self.execute(&request)?;
        self.lock_store().save(record)?;
        Ok(())
    }

    /// Delete `record` on the server and locally.
    ///
    /// Returns whether the local store held the record.
    pub fn unregister(&self, record: &GeofenceRecord) -> Result<bool, GeofenceError> {
        let request = build_delete_request(record)?;
        self.execute(&request)?;
        let Some(code) = record.code.as_deref() else {
            return Ok(false);
        };
        Ok(self.lock_store().delete(code)?)
    }

    /// Download the full snapshot and make the local store mirror it.
    pub fn sync(&self) -> Result<ReconciliationResult, GeofenceError> {
        let response = self.execute(&build_list_request())?;
        let snapshot = decode_geofences(&response.json()?)?;
        let result = {
            let mut store = self.lock_store();
            reconcile(snapshot, &mut *store)?
        };
        for sink in &self.sinks {
            sink.geofences_synced(&result);
        }
        Ok(result)
    }

    /// Report that the device crossed `fences` in direction `crossing_type`.
    ///
    /// Sinks see the events before they are posted. Delivery is at most once:
    /// a transport failure is logged and returned.
    pub fn report_crossing(
        &self,
        fences: &[GeofenceRecord],
        crossing_type: CrossingType,
    ) -> Result<Vec<CrossingEvent>, GeofenceError> {
        let report = CrossingReport {
            crossing_type,
            device_descriptor: &self.config.descriptor,
            sdk_version: &self.config.sdk_version,
            notification_path: &self.config.notification_path,
        };
        let (request, events) = build_crossing_report_request(fences, &report);
        for sink in &self.sinks {
            sink.crossing_detected(&events);
        }
        self.execute(&request)?;
        Ok(events)
    }

    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, GeofenceError> {
        debug!("{} {}", request.method, request.path);
        self.transport.execute(request).map_err(|err| {
            error!("{} {} failed: {err}", request.method, request.path);
            GeofenceError::from(err)
        })
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
