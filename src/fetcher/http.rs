//! HTTP client for the management server REST API
//!
//! Every request is a bearer-authenticated GET against
//! `{server}/api/v2/{endpoint}` with a bounded timeout. Requests are not
//! retried; the first failure is returned to the caller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::{BackupApi, FetcherError, FetcherResult};

/// Versioned API prefix appended to the server address
pub const API_PREFIX: &str = "api/v2";

/// HTTP connect timeout (seconds)
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// reqwest-backed [`BackupApi`] implementation
pub struct UnimusHttpClient {
    client: Client,
    base_url: String,
}

impl UnimusHttpClient {
    /// Create a client for `server_address` authenticating with `api_key`
    ///
    /// # Errors
    /// Returns [`FetcherError::InvalidRequest`] if the key cannot be used as a
    /// header value or the TLS backend fails to initialize.
    pub fn new(server_address: &str, api_key: &str) -> FetcherResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            FetcherError::InvalidRequest(format!("API key is not a valid header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetcherError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: Self::api_root(server_address),
        })
    }

    /// API root for a server address, with any trailing slash removed
    pub fn api_root(server_address: &str) -> String {
        format!("{}/{}", server_address.trim_end_matches('/'), API_PREFIX)
    }

    /// Full URL for an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl BackupApi for UnimusHttpClient {
    async fn get(&self, endpoint: &str) -> FetcherResult<Value> {
        let url = self.endpoint_url(endpoint);
        debug!("Making GET request to: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetcherError::HttpError(format!(
                "GET {url} returned {status}: {error_text}"
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            FetcherError::ParseError(format!("Failed to deserialize response from {url}: {e}"))
        })
    }
}
