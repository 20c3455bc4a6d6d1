//! Error taxonomy shared by the codec, reconciler, request builder and client.

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::Transport).
///
/// The core never inspects or retries these; they are handed back to the
/// caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text returned by the client or server.
        message: String,
    },
    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying cause.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
}

impl TransportError {
    /// HTTP status carried by the error, if the server responded.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network { .. } | Self::Timeout { .. } => None,
        }
    }
}

/// Failure reported by a [`GeofenceStore`](crate::GeofenceStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store only persists registered fences.
    #[error("geofence {name:?} has no code and cannot be persisted")]
    MissingCode {
        /// Name of the rejected record.
        name: Option<String>,
    },
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open geofence database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: std::path::PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Generic SQLite error when reading or writing rows.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Errors raised by geofence synchronisation.
#[derive(Debug, Error)]
pub enum GeofenceError {
    /// A payload lacked a required field or could not be parsed.
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// What was missing or unparsable.
        reason: String,
    },
    /// Update or delete was attempted on a fence without a server code.
    #[error("geofence {name:?} has no server-assigned code")]
    MissingIdentifier {
        /// Name of the offending record.
        name: Option<String>,
    },
    /// The local store holds a fence without a code.
    #[error("local geofence {name:?} has no code; refusing to reconcile")]
    InvalidLocalState {
        /// Name of the offending record.
        name: Option<String>,
    },
    /// The fence centre is outside WGS84 bounds.
    #[error("coordinates ({latitude}, {longitude}) are outside the valid range")]
    InvalidCoordinates {
        /// Offending latitude.
        latitude: f64,
        /// Offending longitude.
        longitude: f64,
    },
    /// The transport failed; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The local store failed.
    #[error("local store failed: {0}")]
    Store(#[from] StoreError),
}

impl GeofenceError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn status_only_for_http_errors() {
        let http = TransportError::Http {
            url: "http://h/geofences".into(),
            status: 503,
            message: "unavailable".into(),
        };
        let timeout = TransportError::Timeout {
            url: "http://h/geofences".into(),
            timeout_secs: 30,
        };
        assert_eq!(http.status(), Some(503));
        assert_eq!(timeout.status(), None);
    }

    #[rstest]
    fn transport_errors_pass_through_verbatim() {
        let source = TransportError::Network {
            url: "http://h/events".into(),
            message: "connection refused".into(),
        };
        let err = GeofenceError::from(source.clone());
        assert_eq!(err.to_string(), source.to_string());
        assert!(matches!(err, GeofenceError::Transport(inner) if inner == source));
    }
}
