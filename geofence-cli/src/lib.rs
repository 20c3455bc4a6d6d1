//! Command-line interface for synchronising geofences with a config connector.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use clap::{Parser, Subcommand};

mod connection;
mod error;
mod fences;
mod output;
mod reconcile;
mod report;
mod sync;

pub use error::CliError;

use connection::{ClientFactory, DefaultClientFactory};
use fences::{RegisterArgs, UnregisterArgs, UpdateArgs, run_register, run_unregister, run_update};
use reconcile::{ReconcileArgs, run_reconcile};
use report::{ReportArgs, run_report};
use sync::{SyncArgs, run_sync};

pub(crate) const ARG_SERVER_URL: &str = "server-url";
pub(crate) const ARG_USERNAME: &str = "username";
pub(crate) const ARG_PASSWORD: &str = "password";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_SLACK_WEBHOOK: &str = "slack-webhook";
pub(crate) const ARG_SLACK_CHANNEL: &str = "slack-channel";
pub(crate) const ARG_CODE: &str = "code";
pub(crate) const ARG_CODES: &str = "codes";
pub(crate) const ARG_NAME: &str = "name";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_RADIUS: &str = "radius";
pub(crate) const ARG_DESCRIPTION: &str = "description";
pub(crate) const ARG_CROSSING: &str = "crossing";
pub(crate) const ARG_DESCRIPTOR: &str = "descriptor";
pub(crate) const ARG_SNAPSHOT: &str = "snapshot";

pub(crate) const ENV_REGISTER_NAME: &str = "GEOFENCE_CMDS_REGISTER_NAME";
pub(crate) const ENV_REGISTER_LATITUDE: &str = "GEOFENCE_CMDS_REGISTER_LATITUDE";
pub(crate) const ENV_REGISTER_LONGITUDE: &str = "GEOFENCE_CMDS_REGISTER_LONGITUDE";
pub(crate) const ENV_UPDATE_CODE: &str = "GEOFENCE_CMDS_UPDATE_CODE";
pub(crate) const ENV_UNREGISTER_CODE: &str = "GEOFENCE_CMDS_UNREGISTER_CODE";
pub(crate) const ENV_REPORT_CODES: &str = "GEOFENCE_CMDS_REPORT_CODES";
pub(crate) const ENV_REPORT_CROSSING: &str = "GEOFENCE_CMDS_REPORT_CROSSING";
pub(crate) const ENV_RECONCILE_SNAPSHOT: &str = "GEOFENCE_CMDS_RECONCILE_SNAPSHOT";

/// Run the geofence CLI with the current process arguments and environment.
///
/// Command results are written to standard output as pretty-printed JSON.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    dispatch(cli.command, &DefaultClientFactory, &mut handle)
}

fn dispatch(
    command: Command,
    factory: &dyn ClientFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Sync(args) => run_sync(args, factory, writer),
        Command::Register(args) => run_register(args, factory, writer),
        Command::Update(args) => run_update(args, factory, writer),
        Command::Unregister(args) => run_unregister(args, factory, writer),
        Command::Report(args) => run_report(args, factory, writer),
        Command::Reconcile(args) => run_reconcile(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geofence",
    about = "Keep a local geofence store in sync with a config connector",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mirror the server's geofences into the local store.
    Sync(SyncArgs),
    /// Register a new geofence.
    Register(RegisterArgs),
    /// Update a registered geofence.
    Update(UpdateArgs),
    /// Delete a geofence on the server and locally.
    Unregister(UnregisterArgs),
    /// Report a boundary crossing for stored geofences.
    Report(ReportArgs),
    /// Apply a saved snapshot to the local store without a server.
    Reconcile(ReconcileArgs),
}

#[cfg(test)]
mod tests;
