//! Test doubles for the transport and sink seams.
//!
//! [`StubTransport`] replays scripted responses and records every request it
//! receives; [`RecordingSink`] captures notifications for later assertions.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    ApiRequest, ApiResponse, CrossingEvent, EventSink, ReconciliationResult, Transport,
    TransportError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted `Transport` that answers requests in FIFO order.
///
/// When the script runs dry the transport fails with
/// [`TransportError::Network`], so unexpected requests surface in tests.
///
/// # Example
///
/// ```
/// use geofence_core::test_support::StubTransport;
/// use geofence_core::{ApiResponse, Transport, build_list_request};
///
/// let transport = StubTransport::default();
/// transport.respond(ApiResponse::new(200, "{}"));
///
/// assert!(transport.execute(&build_list_request()).is_ok());
/// assert!(transport.execute(&build_list_request()).is_err());
/// assert_eq!(transport.requests().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StubTransport {
    script: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    /// Queue a successful response.
    pub fn respond(&self, response: ApiResponse) {
        lock(&self.script).push_back(Ok(response));
    }

    /// Queue a failure.
    pub fn fail(&self, error: TransportError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Every request executed so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        lock(&self.script).pop_front().unwrap_or_else(|| {
            Err(TransportError::Network {
                url: request.path.clone(),
                message: "no scripted response left".to_owned(),
            })
        })
    }
}

/// `EventSink` that remembers every notification.
#[derive(Debug, Default)]
pub struct RecordingSink {
    crossings: Mutex<Vec<CrossingEvent>>,
    syncs: Mutex<Vec<ReconciliationResult>>,
}

impl RecordingSink {
    /// Crossing events received so far.
    #[must_use]
    pub fn crossings(&self) -> Vec<CrossingEvent> {
        lock(&self.crossings).clone()
    }

    /// Reconciliation results received so far.
    #[must_use]
    pub fn syncs(&self) -> Vec<ReconciliationResult> {
        lock(&self.syncs).clone()
    }
}

impl EventSink for RecordingSink {
    fn crossing_detected(&self, events: &[CrossingEvent]) {
        lock(&self.crossings).extend_from_slice(events);
    }

    fn geofences_synced(&self, result: &ReconciliationResult) {
        lock(&self.syncs).push(result.clone());
    }
}
