//! REST API access
//!
//! The pipeline talks to the management server only through [`BackupApi`],
//! which returns the parsed JSON body of a GET against an endpoint relative to
//! the versioned API root. [`http::UnimusHttpClient`] is the reqwest-backed
//! implementation; tests substitute an in-memory one.

use async_trait::async_trait;
use serde_json::Value;

pub mod http;
pub mod memory;
pub mod pagination;
pub mod parser;

pub use http::UnimusHttpClient;
pub use memory::MemoryApi;
pub use pagination::Paginator;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Request could not be sent or timed out
    #[error("network error: {0}")]
    NetworkError(String),

    /// Server answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Body was not the expected JSON
    #[error("parse error: {0}")]
    ParseError(String),

    /// Request could not be built from configuration
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Pagination did not terminate
    #[error("pagination limit exceeded: {0}")]
    PageLimitExceeded(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Authenticated read access to the management server API
#[async_trait]
pub trait BackupApi: Send + Sync {
    /// GET `endpoint` (e.g. `devices?page=0`) and return the JSON body
    ///
    /// A single attempt is made; any transport failure or non-success status
    /// is returned as an error.
    async fn get(&self, endpoint: &str) -> FetcherResult<Value>;
}

