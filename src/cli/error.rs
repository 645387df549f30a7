//! CLI error types and exit status mapping

use crate::config::ConfigError;
use crate::exporter::ExportError;
use crate::fetcher::FetcherError;
use crate::health::HealthError;
use crate::publish::PublishError;

/// Exit status for network, API and IO failures
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for configuration errors
pub const EXIT_CONFIG: i32 = 2;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Health check error
    #[error("health check failed: {0}")]
    HealthError(#[from] HealthError),

    /// Export error
    #[error("export error: {0}")]
    ExportError(#[from] ExportError),

    /// Publish error
    #[error("publish error: {0}")]
    PublishError(#[from] PublishError),

    /// Output could not be rendered
    #[error("output error: {0}")]
    OutputError(String),
}

impl CliError {
    /// Process exit status for this error
    ///
    /// Configuration problems (including an unsupported git protocol) exit
    /// with 2, failed git commands with their own status, everything else
    /// with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigError(_) => EXIT_CONFIG,
            CliError::PublishError(e) => e.exit_code(),
            CliError::FetcherError(_)
            | CliError::HealthError(_)
            | CliError::ExportError(_)
            | CliError::OutputError(_) => EXIT_FAILURE,
        }
    }
}
