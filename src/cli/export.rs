//! Export command implementation
//!
//! Runs the full pipeline: configuration → health check → device directory →
//! backup export → optional git publish.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use super::{CliError, DevicesCommand, ValidateCommand};
use crate::config::Config;
use crate::exporter::{ExportContext, ExportSummary, DEFAULT_BACKUP_DIR};
use crate::fetcher::{BackupApi, UnimusHttpClient};
use crate::health;
use crate::publish::{CommandRunner, GitPublisher, PublishOutcome, SystemCommandRunner};

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "device-backup-exporter.log";

/// Export device configuration backups to disk and git
#[derive(Parser, Debug)]
#[command(name = "device-backup-exporter", version, about, long_about = None)]
pub struct Cli {
    /// Read settings from this TOML file instead of the environment
    #[arg(long, global = true, env = "DEVICE_BACKUP_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file (appended to)
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Root directory of the backup tree
    #[arg(long, global = true, default_value = DEFAULT_BACKUP_DIR)]
    pub backup_dir: PathBuf,

    /// Command to run (defaults to export)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export backups and publish them when configured (default)
    Export,
    /// Check the configuration without contacting the server
    Validate(ValidateCommand),
    /// List the devices visible to the API key
    Devices(DevicesCommand),
}

impl Cli {
    /// Load the configuration from the selected source
    pub fn load_config(&self) -> Result<Config, CliError> {
        let config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::from_env()?,
        };
        Ok(config)
    }

    /// Dispatch to the selected command
    pub async fn execute(&self) -> Result<(), CliError> {
        match &self.command {
            None | Some(Commands::Export) => ExportCommand.execute(self).await.map(|_| ()),
            Some(Commands::Validate(cmd)) => cmd.execute(self),
            Some(Commands::Devices(cmd)) => cmd.execute(self).await,
        }
    }
}

/// Outcome of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Export tallies
    pub summary: ExportSummary,
    /// Publish outcome, when export mode is git
    pub publish: Option<PublishOutcome>,
}

/// The export pipeline
#[derive(Debug, Default, Clone, Copy)]
pub struct ExportCommand;

impl ExportCommand {
    /// Load configuration, connect to the server and run the pipeline
    pub async fn execute(&self, cli: &Cli) -> Result<ExportReport, CliError> {
        let config = cli.load_config()?;
        info!(
            backup_type = %config.backup_mode,
            git = config.export_mode.is_git(),
            "Configuration loaded"
        );

        let api = UnimusHttpClient::new(&config.server_address, &config.api_key)?;
        let mut ctx = ExportContext::new(config, api, cli.backup_dir.clone());
        run_pipeline(&mut ctx, &SystemCommandRunner).await
    }
}

/// Run every stage against an already configured context
///
/// Stops at the first fatal error. Per-backup write failures are logged by the
/// exporter and do not stop the run.
pub async fn run_pipeline<A, R>(
    ctx: &mut ExportContext<A>,
    runner: &R,
) -> Result<ExportReport, CliError>
where
    A: BackupApi,
    R: CommandRunner,
{
    health::check(ctx.api()).await?;

    info!("Getting device data");
    let devices = ctx.load_directory().await?.len();
    info!("Found {} devices", devices);

    let summary = ctx.export_backups().await?;
    info!("Export successful");

    let publish = match (&ctx.config().git, ctx.config().export_mode.is_git()) {
        (Some(git), true) => {
            info!("Pushing to git");
            let outcome = GitPublisher::new(runner, git, ctx.backup_root()).publish()?;
            if outcome == PublishOutcome::NothingToCommit {
                info!("No new backups to commit");
            }
            info!("Push successful");
            Some(outcome)
        }
        _ => None,
    };

    info!("Export run finished");
    info!(
        "Next run in {} seconds (scheduled externally)",
        ctx.config().run_interval
    );

    Ok(ExportReport { summary, publish })
}
