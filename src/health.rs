//! Server health check
//!
//! The export only proceeds when `GET health` reports `data.status == "OK"`.
//! A response without a readable status is reported differently from a
//! readable status that is not `OK`, but both stop the run.

use tracing::{error, info};

use crate::fetcher::parser::ResponseParser;
use crate::fetcher::{BackupApi, FetcherError};

/// Status value reported by a healthy server
pub const HEALTHY_STATUS: &str = "OK";

/// Health check errors
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    /// Request failed
    #[error(transparent)]
    Fetcher(#[from] FetcherError),

    /// Response had no readable `data.status`
    #[error("unable to connect to the server: health response has no status")]
    Unreachable,

    /// Server reported a status other than OK
    #[error("server status: {0}")]
    NotOk(String),
}

/// Check that the server reports itself healthy
///
/// # Errors
/// Returns [`HealthError::Unreachable`] for a malformed response and
/// [`HealthError::NotOk`] with the literal status otherwise.
pub async fn check(api: &dyn BackupApi) -> Result<(), HealthError> {
    let body = api.get("health").await?;

    match ResponseParser::parse_health_status(&body) {
        Some(status) if status == HEALTHY_STATUS => {
            info!("Server status: {}", status);
            Ok(())
        }
        Some(status) => {
            error!("Server status: {}", status);
            Err(HealthError::NotOk(status))
        }
        None => {
            error!("Unable to perform server status check");
            Err(HealthError::Unreachable)
        }
    }
}
