//! Main entry point for the device-backup-exporter CLI

use clap::Parser;
use device_backup_exporter::cli::Cli;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Open the log file for appending
fn open_log_file(path: &Path) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Initialize tracing to stdout and the log file, with optional JSON formatting
fn init_tracing(log_file: &Path) {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("device_backup_exporter=info"));

    let file = open_log_file(log_file);

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .with(file.map(|f| {
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(Mutex::new(f))
            }))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .with(file.map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f))))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.log_file);

    if let Err(e) = cli.execute().await {
        error!("Command failed: {}", e);
        std::process::exit(e.exit_code());
    }
}
