//! `report` command: post a boundary crossing for stored fences.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geofence_core::{ClientConfig, CrossingType};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::connection::{ClientFactory, ConnectionConfig, DEFAULT_DESCRIPTOR};
use crate::output::write_json;
use crate::{
    ARG_CODES, ARG_CROSSING, ARG_DATABASE, ARG_DESCRIPTOR, ARG_PASSWORD, ARG_SERVER_URL,
    ARG_SLACK_CHANNEL, ARG_SLACK_WEBHOOK, ARG_USERNAME, CliError, ENV_REPORT_CODES,
    ENV_REPORT_CROSSING,
};

/// CLI arguments for the `report` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Report that this device entered or left one or more stored \
                 geofences. Every event in the batch shares one detection time.",
    about = "Report a boundary crossing"
)]
#[ortho_config(prefix = "GEOFENCE")]
pub(crate) struct ReportArgs {
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
    /// Comma-separated codes of the crossed fences.
    #[arg(long = ARG_CODES, value_name = "code,...")]
    #[serde(default)]
    pub(crate) codes: Option<String>,
    /// Crossing direction: `enter` or `exit`.
    #[arg(long = ARG_CROSSING, value_name = "enter|exit")]
    #[serde(default)]
    pub(crate) crossing: Option<String>,
    /// Device descriptor sent with each event.
    #[arg(long = ARG_DESCRIPTOR, value_name = "descriptor")]
    #[serde(default)]
    pub(crate) descriptor: Option<String>,
    /// Slack incoming-webhook URL to mirror the crossing to.
    #[arg(long = ARG_SLACK_WEBHOOK, value_name = "url")]
    #[serde(default)]
    pub(crate) slack_webhook: Option<String>,
    /// Slack channel overriding the webhook default.
    #[arg(long = ARG_SLACK_CHANNEL, value_name = "channel")]
    #[serde(default)]
    pub(crate) slack_channel: Option<String>,
}

/// Resolved `report` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportConfig {
    pub(crate) connection: ConnectionConfig,
    pub(crate) codes: Vec<String>,
    pub(crate) crossing: CrossingType,
    pub(crate) descriptor: String,
}

impl TryFrom<ReportArgs> for ReportConfig {
    type Error = CliError;

    fn try_from(args: ReportArgs) -> Result<Self, Self::Error> {
        let raw_codes = args.codes.ok_or(CliError::MissingArgument {
            field: ARG_CODES,
            env: ENV_REPORT_CODES,
        })?;
        let codes: Vec<String> = raw_codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_owned)
            .collect();
        if codes.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_CODES,
                env: ENV_REPORT_CODES,
            });
        }
        let crossing = args
            .crossing
            .ok_or(CliError::MissingArgument {
                field: ARG_CROSSING,
                env: ENV_REPORT_CROSSING,
            })?
            .parse::<CrossingType>()?;
        Ok(Self {
            connection: ConnectionConfig::from_options(
                args.server_url,
                args.username,
                args.password,
                args.database,
            )
            .with_slack(args.slack_webhook, args.slack_channel),
            codes,
            crossing,
            descriptor: args
                .descriptor
                .unwrap_or_else(|| DEFAULT_DESCRIPTOR.to_owned()),
        })
    }
}

pub(crate) fn run_report(
    args: ReportArgs,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    report_with_config(&ReportConfig::try_from(merged)?, factory, writer)
}

pub(crate) fn report_with_config(
    config: &ReportConfig,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let connection = &config.connection;
    let client = factory.connect(
        connection,
        ClientConfig::new(connection.acting_user(), config.descriptor.as_str()),
    )?;
    let fences = config
        .codes
        .iter()
        .map(|code| {
            client
                .find(code)?
                .ok_or_else(|| CliError::UnknownGeofence { code: code.clone() })
        })
        .collect::<Result<Vec<_>, CliError>>()?;
    let events = client.report_crossing(&fences, config.crossing)?;
    write_json(writer, &events)
}
