//! `reconcile` command: apply a saved snapshot to the local store offline.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::File};
use clap::Parser;
use geofence_core::codec::decode_geofences;
use geofence_core::{GeofenceRecord, reconcile};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{DEFAULT_DATABASE, open_store};
use crate::output::write_json;
use crate::{ARG_DATABASE, ARG_SNAPSHOT, CliError, ENV_RECONCILE_SNAPSHOT};

/// CLI arguments for the `reconcile` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a GeoJSON FeatureCollection exported from the config \
                 connector and make the local store mirror it without \
                 contacting the server.",
    about = "Mirror a saved snapshot locally"
)]
#[ortho_config(prefix = "GEOFENCE")]
pub(crate) struct ReconcileArgs {
    /// Path to the local SQLite store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to the FeatureCollection JSON file.
    #[arg(long = ARG_SNAPSHOT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
}

/// Resolved `reconcile` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReconcileConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) snapshot: Utf8PathBuf,
}

impl TryFrom<ReconcileArgs> for ReconcileConfig {
    type Error = CliError;

    fn try_from(args: ReconcileArgs) -> Result<Self, Self::Error> {
        let snapshot = args.snapshot.ok_or(CliError::MissingArgument {
            field: ARG_SNAPSHOT,
            env: ENV_RECONCILE_SNAPSHOT,
        })?;
        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            snapshot,
        })
    }
}

pub(crate) fn run_reconcile(args: ReconcileArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    reconcile_with_config(&ReconcileConfig::try_from(merged)?, writer)
}

pub(crate) fn reconcile_with_config(
    config: &ReconcileConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let snapshot = read_snapshot(&config.snapshot)?;
    let mut store = open_store(&config.database)?;
    let result = reconcile(snapshot, &mut store)?;
    info!(
        "reconciled {} geofence(s) from {}, deleted {}",
        result.total_count,
        config.snapshot,
        result.deleted_codes.len()
    );
    write_json(writer, &result)
}

fn read_snapshot(path: &Utf8Path) -> Result<Vec<GeofenceRecord>, CliError> {
    let file =
        File::open_ambient(path, ambient_authority()).map_err(|source| CliError::OpenSnapshot {
            path: path.to_path_buf(),
            source,
        })?;
    let collection: Value = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        CliError::ParseSnapshot {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(decode_geofences(&collection)?)
}
