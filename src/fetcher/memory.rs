//! In-memory [`BackupApi`] with canned responses
//!
//! Stands in for the server in tests: responses are keyed by the exact
//! endpoint string (including the `page` parameter) and every request is
//! recorded.
//! Endpoints with no canned response answer with an empty page.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::fetcher::{BackupApi, FetcherError, FetcherResult};

/// Canned-response API server
#[derive(Debug, Default)]
pub struct MemoryApi {
    responses: HashMap<String, Value>,
    failures: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryApi {
    /// Empty server: every endpoint returns `{"data": []}`
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `endpoint` with the raw `body`
    pub fn with_response(mut self, endpoint: impl Into<String>, body: Value) -> Self {
        self.responses.insert(endpoint.into(), body);
        self
    }

    /// Respond to `endpoint` with `{"data": data}`
    pub fn with_page(self, endpoint: impl Into<String>, data: Value) -> Self {
        self.with_response(endpoint, json!({ "data": data }))
    }

    /// Fail requests to `endpoint` with an HTTP error
    pub fn with_failure(mut self, endpoint: impl Into<String>) -> Self {
        self.failures.insert(endpoint.into());
        self
    }

    /// Endpoints requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BackupApi for MemoryApi {
    async fn get(&self, endpoint: &str) -> FetcherResult<Value> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(endpoint.to_string());
        }

        if self.failures.contains(endpoint) {
            return Err(FetcherError::HttpError(format!(
                "GET {endpoint} returned 500 Internal Server Error"
            )));
        }

        Ok(self
            .responses
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| json!({ "data": [] })))
    }
}
