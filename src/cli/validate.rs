//! Validation subcommand

use clap::Args;

use super::{Cli, CliError};

/// Check the configuration without contacting the server
#[derive(Args, Debug, Default)]
pub struct ValidateCommand {
    /// Print only the result line
    #[arg(long, short)]
    pub quiet: bool,
}

impl ValidateCommand {
    /// Load the configuration and print a masked summary of it
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = match cli.load_config() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                return Err(e);
            }
        };

        println!("Configuration is valid");
        if !self.quiet {
            println!("{}", config.summary());
            println!("  Backup directory: {}", cli.backup_dir.display());
            if cli.backup_dir.exists() && !cli.backup_dir.is_dir() {
                println!("  Warning: backup directory path exists and is not a directory");
            }
        }
        Ok(())
    }
}
