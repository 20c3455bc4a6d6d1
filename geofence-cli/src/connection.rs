//! Shared connector settings and client construction.

use camino::{Utf8Path, Utf8PathBuf};
use geofence_core::{
    ClientConfig, GeofenceClient, GeofenceStore, LogSink, SqliteGeofenceStore, Transport,
};
use geofence_http::{
    DEFAULT_BASE_URL, HttpTransport, HttpTransportConfig, SlackNotifier, SlackNotifierConfig,
};

use crate::CliError;

/// Default location of the local SQLite store.
pub(crate) const DEFAULT_DATABASE: &str = "geofences.db";

/// Device descriptor sent when no `--descriptor` is given.
pub(crate) const DEFAULT_DESCRIPTOR: &str = "geofence-cli";

/// Client type the commands operate on.
pub(crate) type CliClient =
    GeofenceClient<Box<dyn GeofenceStore + Send>, Box<dyn Transport>>;

/// Resolved connector, store and notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConnectionConfig {
    /// Base URL of the config connector.
    pub(crate) server_url: String,
    /// Basic-auth credentials.
    pub(crate) credentials: Option<(String, String)>,
    /// Path to the local SQLite store.
    pub(crate) database: Utf8PathBuf,
    /// Slack webhook to mirror notifications to.
    pub(crate) slack: Option<SlackNotifierConfig>,
}

impl ConnectionConfig {
    /// Apply defaults to optional connector flags.
    pub(crate) fn from_options(
        server_url: Option<String>,
        username: Option<String>,
        password: Option<String>,
        database: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            server_url: server_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            credentials: username.map(|user| (user, password.unwrap_or_default())),
            database: database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            slack: None,
        }
    }

    /// Mirror notifications to a Slack webhook when one is configured.
    pub(crate) fn with_slack(mut self, webhook: Option<String>, channel: Option<String>) -> Self {
        self.slack = webhook.map(|url| {
            let config = SlackNotifierConfig::new(url);
            match channel {
                Some(channel) => config.with_channel(channel),
                None => config,
            }
        });
        self
    }

    /// User recorded in update stamps: the basic-auth user, or `anonymous`.
    pub(crate) fn acting_user(&self) -> &str {
        self.credentials
            .as_ref()
            .map_or("anonymous", |(user, _)| user.as_str())
    }
}

/// Builds a client for the current command invocation.
pub(crate) trait ClientFactory {
    fn connect(&self, config: &ConnectionConfig, client: ClientConfig)
    -> Result<CliClient, CliError>;
}

/// Connects to the configured connector over HTTP with a SQLite store.
pub(crate) struct DefaultClientFactory;

impl ClientFactory for DefaultClientFactory {
    fn connect(
        &self,
        config: &ConnectionConfig,
        client: ClientConfig,
    ) -> Result<CliClient, CliError> {
        let store = open_store(&config.database)?;
        let mut transport_config = HttpTransportConfig::new(config.server_url.clone());
        if let Some((username, password)) = &config.credentials {
            transport_config = transport_config.with_credentials(username, password);
        }
        let transport =
            HttpTransport::with_config(transport_config).map_err(|source| CliError::BuildHttp {
                url: config.server_url.clone(),
                source,
            })?;
        let mut geofences = GeofenceClient::new(
            Box::new(store) as Box<dyn GeofenceStore + Send>,
            Box::new(transport) as Box<dyn Transport>,
            client,
        )
        .with_sink(LogSink);
        if let Some(slack) = &config.slack {
            let notifier =
                SlackNotifier::new(slack.clone()).map_err(|source| CliError::BuildHttp {
                    url: slack.webhook_url.clone(),
                    source,
                })?;
            geofences = geofences.with_sink(notifier);
        }
        Ok(geofences)
    }
}

/// Open (creating if needed) the SQLite store at `path`.
pub(crate) fn open_store(path: &Utf8Path) -> Result<SqliteGeofenceStore, CliError> {
    SqliteGeofenceStore::open(path.as_std_path()).map_err(|source| CliError::OpenStore {
        path: path.to_path_buf(),
        source,
    })
}
