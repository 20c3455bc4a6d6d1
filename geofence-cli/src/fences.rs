//! `register`, `update` and `unregister` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geofence_core::{ClientConfig, GeofenceRecord, UNSPECIFIED_RADIUS};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::connection::{ClientFactory, ConnectionConfig, DEFAULT_DESCRIPTOR};
use crate::output::write_json;
use crate::{
    ARG_CODE, ARG_DATABASE, ARG_DESCRIPTION, ARG_LATITUDE, ARG_LONGITUDE, ARG_NAME, ARG_PASSWORD,
    ARG_RADIUS, ARG_SERVER_URL, ARG_USERNAME, CliError, ENV_REGISTER_LATITUDE,
    ENV_REGISTER_LONGITUDE, ENV_REGISTER_NAME, ENV_UNREGISTER_CODE, ENV_UPDATE_CODE,
};

/// CLI arguments for the `register` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Register a new geofence with the config connector")]
#[ortho_config(prefix = "GEOFENCE")]
pub(crate) struct RegisterArgs {
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
    /// Display name of the fence.
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// Latitude of the centre in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the centre in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Radius in metres; unspecified when omitted.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Free-text description.
    #[arg(long = ARG_DESCRIPTION, value_name = "text")]
    #[serde(default)]
    pub(crate) description: Option<String>,
}

/// Resolved `register` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegisterConfig {
    pub(crate) connection: ConnectionConfig,
    pub(crate) fence: GeofenceRecord,
}

impl TryFrom<RegisterArgs> for RegisterConfig {
    type Error = CliError;

    fn try_from(args: RegisterArgs) -> Result<Self, Self::Error> {
        let name = args.name.ok_or(CliError::MissingArgument {
            field: ARG_NAME,
            env: ENV_REGISTER_NAME,
        })?;
        let latitude = args.latitude.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_REGISTER_LATITUDE,
        })?;
        let longitude = args.longitude.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_REGISTER_LONGITUDE,
        })?;
        let mut fence = GeofenceRecord::draft(
            name,
            latitude,
            longitude,
            args.radius.unwrap_or(UNSPECIFIED_RADIUS),
        );
        if let Some(description) = args.description {
            fence = fence.with_description(description);
        }
        Ok(Self {
            connection: ConnectionConfig::from_options(
                args.server_url,
                args.username,
                args.password,
                args.database,
            ),
            fence,
        })
    }
}

pub(crate) fn run_register(
    args: RegisterArgs,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    register_with_config(&RegisterConfig::try_from(merged)?, factory, writer)
}

pub(crate) fn register_with_config(
    config: &RegisterConfig,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let connection = &config.connection;
    let client = factory.connect(
        connection,
        ClientConfig::new(connection.acting_user(), DEFAULT_DESCRIPTOR),
    )?;
    let registered = client.register(&config.fence)?;
    write_json(writer, &registered)
}

/// CLI arguments for the `update` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Change a registered geofence. Fields that are not given keep \
                 the value from the local store.",
    about = "Update a registered geofence"
)]
#[ortho_config(prefix = "GEOFENCE")]
pub(crate) struct UpdateArgs {
    /// Base URL of the config connector.
    #[arg(long = ARG_SERVER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) server_url: Option<String>,
    /// Basic-auth user name, also recorded as the updating user.
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
    /// Code of the fence to update.
    #[arg(long = ARG_CODE, value_name = "code")]
    #[serde(default)]
    pub(crate) code: Option<String>,
    /// New display name.
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// New centre latitude.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// New centre longitude.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// New radius in metres.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// New description.
    #[arg(long = ARG_DESCRIPTION, value_name = "text")]
    #[serde(default)]
    pub(crate) description: Option<String>,
}

/// Field overrides applied to the stored fence.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FenceChanges {
    pub(crate) name: Option<String>,
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) radius: Option<f64>,
    pub(crate) description: Option<String>,
}

impl FenceChanges {
    fn apply_to(&self, stored: &GeofenceRecord) -> GeofenceRecord {
        let mut changed = stored.clone();
        if let Some(name) = &self.name {
            changed.name = Some(name.clone());
        }
        if let Some(description) = &self.description {
            changed.description = Some(description.clone());
        }
        changed.center.x = self.longitude.unwrap_or(stored.longitude());
        changed.center.y = self.latitude.unwrap_or(stored.latitude());
        changed.radius = self.radius.unwrap_or(stored.radius);
        changed
    }
}

/// Resolved `update` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UpdateConfig {
    pub(crate) connection: ConnectionConfig,
    pub(crate) code: String,
    pub(crate) changes: FenceChanges,
}

impl TryFrom<UpdateArgs> for UpdateConfig {
    type Error = CliError;

    fn try_from(args: UpdateArgs) -> Result<Self, Self::Error> {
        let code = args.code.ok_or(CliError::MissingArgument {
            field: ARG_CODE,
            env: ENV_UPDATE_CODE,
        })?;
        Ok(Self {
            connection: ConnectionConfig::from_options(
                args.server_url,
                args.username,
                args.password,
                args.database,
            ),
            code,
            changes: FenceChanges {
                name: args.name,
                latitude: args.latitude,
                longitude: args.longitude,
                radius: args.radius,
                description: args.description,
            },
        })
    }
}

pub(crate) fn run_update(
    args: UpdateArgs,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    update_with_config(&UpdateConfig::try_from(merged)?, factory, writer)
}

pub(crate) fn update_with_config(
    config: &UpdateConfig,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let connection = &config.connection;
    let client = factory.connect(
        connection,
        ClientConfig::new(connection.acting_user(), DEFAULT_DESCRIPTOR),
    )?;
    let stored = client
        .find(&config.code)?
        .ok_or_else(|| CliError::UnknownGeofence {
            code: config.code.clone(),
        })?;
    let changed = config.changes.apply_to(&stored);
    client.update(&changed)?;
    write_json(writer, &changed)
}

/// CLI arguments for the `unregister` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Delete a geofence on the server and locally")]
#[ortho_config(prefix = "GEOFENCE")]
pub(crate) struct UnregisterArgs {
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
    /// Code of the fence to delete.
    #[arg(long = ARG_CODE, value_name = "code")]
    #[serde(default)]
    pub(crate) code: Option<String>,
}

/// Resolved `unregister` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnregisterConfig {
    pub(crate) connection: ConnectionConfig,
    pub(crate) code: String,
}

impl TryFrom<UnregisterArgs> for UnregisterConfig {
    type Error = CliError;

    fn try_from(args: UnregisterArgs) -> Result<Self, Self::Error> {
        let code = args.code.ok_or(CliError::MissingArgument {
            field: ARG_CODE,
            env: ENV_UNREGISTER_CODE,
        })?;
        Ok(Self {
            connection: ConnectionConfig::from_options(
                args.server_url,
                args.username,
                args.password,
                args.database,
            ),
            code,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Unregistered<'a> {
    code: &'a str,
    removed_locally: bool,
}

pub(crate) fn run_unregister(
    args: UnregisterArgs,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    unregister_with_config(&UnregisterConfig::try_from(merged)?, factory, writer)
}

pub(crate) fn unregister_with_config(
    config: &UnregisterConfig,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let connection = &config.connection;
    let client = factory.connect(
        connection,
        ClientConfig::new(connection.acting_user(), DEFAULT_DESCRIPTOR),
    )?;
    let stored = client
        .find(&config.code)?
        .ok_or_else(|| CliError::UnknownGeofence {
            code: config.code.clone(),
        })?;
    let removed_locally = client.unregister(&stored)?;
    write_json(
        writer,
        &Unregistered {
            code: &config.code,
            removed_locally,
        },
    )
}
