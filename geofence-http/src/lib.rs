//! HTTP plumbing for geofence synchronisation.
//!
//! [`HttpTransport`] executes connector requests with reqwest, adding basic
//! auth, timeouts and a user agent. [`SlackNotifier`] forwards crossing and
//! sync notifications to a Slack incoming webhook.
//!
//! Both implement the synchronous traits of `geofence-core` by blocking on a
//! Tokio runtime internally.

#![forbid(unsafe_code)]

mod error;
mod runtime;
mod slack;
mod transport;

pub use error::BuildError;
pub use slack::{SlackNotifier, SlackNotifierConfig, format_crossing_message, format_sync_message};
pub use transport::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpTransport, HttpTransportConfig};
