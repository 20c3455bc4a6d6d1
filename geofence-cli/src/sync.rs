//! `sync` command: download the snapshot and mirror it locally.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geofence_core::ClientConfig;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::connection::{ClientFactory, ConnectionConfig, DEFAULT_DESCRIPTOR};
use crate::output::write_json;
use crate::{
    ARG_DATABASE, ARG_PASSWORD, ARG_SERVER_URL, ARG_SLACK_CHANNEL, ARG_SLACK_WEBHOOK,
    ARG_USERNAME, CliError,
};

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download every geofence from the config connector and make \
                 the local store mirror it: matching codes are updated, new \
                 codes created and codes missing from the server deleted.",
    about = "Mirror the server's geofences locally"
)]
#[ortho_config(prefix = "GEOFENCE")]
pub(crate) struct SyncArgs {
    /// Base URL of the config connector.
    #[arg(long = ARG_SERVER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) server_url: Option<String>,
    /// Basic-auth user name.
    #[arg(long = ARG_USERNAME, value_name = "user")]
    #[serde(default)]
    pub(crate) username: Option<String>,
    /// Basic-auth password.
    #[arg(long = ARG_PASSWORD, value_name = "password")]
    #[serde(default)]
    pub(crate) password: Option<String>,
    /// Path to the local SQLite store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Slack incoming-webhook URL to post the sync summary to.
    #[arg(long = ARG_SLACK_WEBHOOK, value_name = "url")]
    #[serde(default)]
    pub(crate) slack_webhook: Option<String>,
    /// Slack channel overriding the webhook default.
    #[arg(long = ARG_SLACK_CHANNEL, value_name = "channel")]
    #[serde(default)]
    pub(crate) slack_channel: Option<String>,
}

impl SyncArgs {
    fn into_config(self) -> Result<ConnectionConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(ConnectionConfig::from(merged))
    }
}

impl From<SyncArgs> for ConnectionConfig {
    fn from(args: SyncArgs) -> Self {
        Self::from_options(args.server_url, args.username, args.password, args.database)
            .with_slack(args.slack_webhook, args.slack_channel)
    }
}

pub(crate) fn run_sync(
    args: SyncArgs,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    sync_with_config(&args.into_config()?, factory, writer)
}

pub(crate) fn sync_with_config(
    config: &ConnectionConfig,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let client = factory.connect(
        config,
        ClientConfig::new(config.acting_user(), DEFAULT_DESCRIPTOR),
    )?;
    let result = client.sync()?;
    write_json(writer, &result)
}
