//! Error types emitted by the geofence CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use geofence_core::{GeofenceError, ParseCrossingTypeError, StoreError};
use geofence_http::BuildError;
use thiserror::Error;

/// Errors emitted by the geofence CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The crossing type was neither `enter` nor `exit`.
    #[error(transparent)]
    CrossingType(#[from] ParseCrossingTypeError),
    /// A geofence code is not in the local store.
    #[error("geofence {code:?} is not in the local store; run `geofence sync` first")]
    UnknownGeofence { code: String },
    /// Opening the local SQLite store failed.
    #[error("failed to open local store at {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: StoreError,
    },
    /// Constructing the HTTP transport or Slack notifier failed.
    #[error("failed to build HTTP client for {url:?}: {source}")]
    BuildHttp {
        url: String,
        #[source]
        source: BuildError,
    },
    /// Opening the snapshot file failed.
    #[error("failed to open snapshot at {path:?}: {source}")]
    OpenSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Snapshot JSON could not be parsed.
    #[error("failed to parse snapshot JSON at {path:?}: {source}")]
    ParseSnapshot {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A synchronisation operation failed.
    #[error(transparent)]
    Geofence(#[from] GeofenceError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
