//! Outbound requests to the config connector and interpretation of replies.
//!
//! Builders are pure: they produce an [`ApiRequest`] (method, path relative
//! to the service base URL, optional JSON body) and leave execution to a
//! [`Transport`](crate::Transport).

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, Utc};
use log::error;
use serde_json::Value;

use crate::codec::{encode_create, encode_crossing_batch, encode_update};
use crate::{CrossingEvent, CrossingType, GeofenceError, GeofenceRecord};

/// Collection path of the geofence resource.
pub const GEOFENCES_PATH: &str = "geofences";

/// Default path crossing reports are posted to.
pub const DEFAULT_NOTIFICATION_PATH: &str = "events";

/// HTTP verbs used by the connector API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Fetch a resource.
    Get,
    /// Create a resource or submit a report.
    Post,
    /// Replace a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready for a transport to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path relative to the service base URL, without a leading slash.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// A successful reply from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Construct a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, GeofenceError> {
        serde_json::from_str(&self.body).map_err(|err| {
            error!("response body is not valid JSON: {err}");
            GeofenceError::malformed(format!("response body is not valid JSON: {err}"))
        })
    }
}

fn ensure_valid_center(record: &GeofenceRecord) -> Result<(), GeofenceError> {
    if record.has_valid_center() {
        return Ok(());
    }
    error!(
        "geofence {} has out-of-range coordinates ({}, {})",
        record.label(),
        record.latitude(),
        record.longitude()
    );
    Err(GeofenceError::InvalidCoordinates {
        latitude: record.latitude(),
        longitude: record.longitude(),
    })
}

fn resource_path(record: &GeofenceRecord) -> Result<String, GeofenceError> {
    let Some(code) = record.code.as_deref() else {
        error!("geofence {:?} has no code; cannot address it", record.name);
        return Err(GeofenceError::MissingIdentifier {
            name: record.name.clone(),
        });
    };
    Ok(format!("{GEOFENCES_PATH}/{code}"))
}

/// `GET geofences`: download the full snapshot.
#[must_use]
pub fn build_list_request() -> ApiRequest {
    ApiRequest::new(HttpMethod::Get, GEOFENCES_PATH, None)
}

/// `POST geofences`: register a new fence.
///
/// # Examples
/// ```
/// use geofence_core::{GeofenceRecord, HttpMethod, build_create_request};
///
/// let request = build_create_request(&GeofenceRecord::draft("Home", 20.0, 10.0, 50.0))?;
/// assert_eq!(request.method, HttpMethod::Post);
/// assert_eq!(request.path, "geofences");
/// # Ok::<(), geofence_core::GeofenceError>(())
/// ```
pub fn build_create_request(record: &GeofenceRecord) -> Result<ApiRequest, GeofenceError> {
    ensure_valid_center(record)?;
    Ok(ApiRequest::new(
        HttpMethod::Post,
        GEOFENCES_PATH,
        Some(encode_create(record)),
    ))
}

/// `PUT geofences/{code}`: replace a registered fence, stamped now.
pub fn build_update_request(
    record: &GeofenceRecord,
    acting_user: &str,
) -> Result<ApiRequest, GeofenceError> {
    build_update_request_at(record, acting_user, Utc::now())
}

/// As [`build_update_request`] with an explicit `@updated` timestamp.
pub fn build_update_request_at(
    record: &GeofenceRecord,
    acting_user: &str,
    at: DateTime<Utc>,
) -> Result<ApiRequest, GeofenceError> {
    let path = resource_path(record)?;
    ensure_valid_center(record)?;
    Ok(ApiRequest::new(
        HttpMethod::Put,
        path,
        Some(encode_update(record, acting_user, at)),
    ))
}

/// `DELETE geofences/{code}`: unregister a fence.
pub fn build_delete_request(record: &GeofenceRecord) -> Result<ApiRequest, GeofenceError> {
    Ok(ApiRequest::new(
        HttpMethod::Delete,
        resource_path(record)?,
        None,
    ))
}

/// Parameters of a crossing report besides the fences themselves.
#[derive(Debug, Clone, Copy)]
pub struct CrossingReport<'a> {
    /// Direction of the crossing.
    pub crossing_type: CrossingType,
    /// Stable per-install device identifier.
    pub device_descriptor: &'a str,
    /// Version of the reporting SDK.
    pub sdk_version: &'a str,
    /// Endpoint path the batch is posted to.
    pub notification_path: &'a str,
}

/// `POST <notification path>`: report crossings of `fences`, detected now.
///
/// Returns the events alongside the request so callers can forward them to
/// sinks.
#[must_use]
pub fn build_crossing_report_request(
    fences: &[GeofenceRecord],
    report: &CrossingReport<'_>,
) -> (ApiRequest, Vec<CrossingEvent>) {
    build_crossing_report_request_at(fences, report, Local::now().fixed_offset())
}

/// As [`build_crossing_report_request`] with an explicit detection time.
#[must_use]
pub fn build_crossing_report_request_at(
    fences: &[GeofenceRecord],
    report: &CrossingReport<'_>,
    detected_at: DateTime<FixedOffset>,
) -> (ApiRequest, Vec<CrossingEvent>) {
    let events = CrossingEvent::for_fences(
        fences,
        report.crossing_type,
        report.device_descriptor,
        report.sdk_version,
        detected_at,
    );
    let body = encode_crossing_batch(&events, report.sdk_version);
    let request = ApiRequest::new(HttpMethod::Post, report.notification_path, Some(body));
    (request, events)
}

/// Extract the code assigned by a successful create.
///
/// The code may sit at top level or under `properties`, keyed `code` or the
/// legacy `@code`; `code` wins. A success without any code is malformed.
pub fn parse_create_response(body: &Value) -> Result<String, GeofenceError> {
    [Some(body), body.get("properties")]
        .into_iter()
        .flatten()
        .find_map(|object| {
            ["code", "@code"]
                .into_iter()
                .find_map(|key| object.get(key).and_then(Value::as_str))
        })
        .map(str::to_owned)
        .ok_or_else(|| {
            error!("create response carries no geofence code");
            GeofenceError::malformed("create response carries no geofence code")
        })
}
