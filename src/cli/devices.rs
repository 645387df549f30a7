//! CLI command for listing devices known to the server

use clap::Args;

use super::{Cli, CliError};
use crate::directory::DeviceDirectory;
use crate::fetcher::UnimusHttpClient;
use crate::health;

/// Devices subcommand
#[derive(Debug, Args)]
pub struct DevicesCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// Output format for the devices command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl DevicesCommand {
    /// Check server health, fetch the device directory and print it
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = cli.load_config()?;
        let api = UnimusHttpClient::new(&config.server_address, &config.api_key)?;

        health::check(&api).await?;
        let directory = DeviceDirectory::build(&api).await?;

        println!("{}", render(&directory, self.format)?);
        Ok(())
    }
}

/// Render the directory in the requested format
pub fn render(directory: &DeviceDirectory, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&directory.entries())
            .map_err(|e| CliError::OutputError(format!("Failed to serialize devices: {}", e))),
        OutputFormat::Human => {
            let mut out = format!("Found {} devices:", directory.len());
            for entry in directory.entries() {
                out.push_str(&format!("\n{} | {}", entry.id, entry.address));
            }
            Ok(out)
        }
    }
}
