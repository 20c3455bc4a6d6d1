//! reqwest-backed [`Transport`] for the config connector.
//!
//! # Example
//!
//! ```no_run
//! use geofence_core::{Transport, build_list_request};
//! use geofence_http::{HttpTransport, HttpTransportConfig};
//!
//! let transport = HttpTransport::with_config(
//!     HttpTransportConfig::new("https://connector.example.com/api/")
//!         .with_credentials("alice", "secret"),
//! )?;
//! let response = transport.execute(&build_list_request())?;
//! println!("{}", response.body);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geofence_core::{ApiRequest, ApiResponse, HttpMethod, Transport, TransportError};
use log::{debug, error};
use reqwest::{Client, Method};

use crate::BuildError;
use crate::runtime::BlockingRuntime;

/// Default user agent for connector requests.
pub const DEFAULT_USER_AGENT: &str = concat!("geofence-sync/", env!("CARGO_PKG_VERSION"));

/// Default connector location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpTransport`].
#[derive(Clone)]
pub struct HttpTransportConfig {
    /// Base URL request paths are resolved against.
    pub base_url: String,
    /// Basic-auth user name, if the connector requires one.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            username: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpTransportConfig {
    /// Create a configuration for the connector at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Authenticate every request with HTTP basic auth.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Executes connector requests over HTTP, blocking the calling thread.
///
/// The owned Tokio runtime is reused across calls. Inside a multi-threaded
/// runtime the caller's runtime is used instead.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
    runtime: BlockingRuntime,
}

impl HttpTransport {
    /// Create a transport for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or if the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BuildError> {
        Self::with_config(HttpTransportConfig::new(base_url))
    }

    /// Create a transport with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or if the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, BuildError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(BuildError::InvalidBaseUrl {
                url: config.base_url,
            });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(BuildError::HttpClient)?;
        let runtime = BlockingRuntime::new().map_err(BuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Transport configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Resolve a request path against the base URL.
    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute_async(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request.path);
        let mut builder = self.client.request(method_of(request.method), &url);
        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_deref());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        if !status.is_success() {
            return Err(TransportError::Http {
                url,
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }
        Ok(ApiResponse::new(status.as_u16(), body))
    }

    /// Convert a reqwest error to a `TransportError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TransportError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TransportError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

const fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        debug!("{} {}", request.method, self.url_for(&request.path));
        self.runtime
            .block_on(self.execute_async(request))
            .inspect_err(|err| error!("connector request failed: {err}"))
    }
}
