//! Construction errors for the HTTP-backed components.

use thiserror::Error;

/// Failure to build an [`HttpTransport`](crate::HttpTransport) or
/// [`SlackNotifier`](crate::SlackNotifier).
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base URL {url:?}: expected an http:// or https:// URL")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
    },
}
