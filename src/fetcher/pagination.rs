//! Page-numbered pagination over listing endpoints
//!
//! Every listing endpoint of the API takes a zero-based `page` query parameter
//! and returns `{ "data": [...] }`. A page with an empty (or absent) `data`
//! array ends the listing, and no further request is made after it.
//!
//! Includes a safety cap on the number of pages so a server that never
//! returns an empty page cannot keep the export running forever.

use serde_json::Value;
use tracing::debug;

use crate::fetcher::{BackupApi, FetcherError, FetcherResult};

/// Maximum number of pages fetched from a single listing
pub const MAX_PAGES: u64 = 10_000;

/// Cursor over the pages of one listing endpoint
///
/// ```no_run
/// # use device_backup_exporter::fetcher::{BackupApi, Paginator, FetcherResult};
/// # async fn example(api: &dyn BackupApi) -> FetcherResult<()> {
/// let mut pages = Paginator::new("devices");
/// while let Some(records) = pages.next_page(api).await? {
///     println!("{} records", records.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Paginator {
    endpoint: String,
    next: u64,
    done: bool,
    max_pages: u64,
}

impl Paginator {
    /// Start paginating `endpoint` at page 0
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            next: 0,
            done: false,
            max_pages: MAX_PAGES,
        }
    }

    /// Override the page cap
    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Endpoint with the page parameter for `page`
    pub fn page_endpoint(&self, page: u64) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", self.endpoint, separator, page)
    }

    /// Number of page requests issued so far
    pub fn pages_fetched(&self) -> u64 {
        self.next
    }

    /// Fetch the next page
    ///
    /// Returns `Ok(None)` once an empty page has been seen; subsequent calls
    /// return `Ok(None)` without issuing a request.
    ///
    /// # Errors
    /// Propagates fetch errors, returns [`FetcherError::ParseError`] when
    /// `data` is not an array and [`FetcherError::PageLimitExceeded`] when the
    /// page cap is reached.
    pub async fn next_page(&mut self, api: &dyn BackupApi) -> FetcherResult<Option<Vec<Value>>> {
        if self.done {
            return Ok(None);
        }

        if self.next >= self.max_pages {
            self.done = true;
            return Err(FetcherError::PageLimitExceeded(format!(
                "{} returned {} non-empty pages - possible infinite loop",
                self.endpoint, self.max_pages
            )));
        }

        let endpoint = self.page_endpoint(self.next);
        debug!("Fetching {}", endpoint);
        let body = api.get(&endpoint).await?;
        self.next += 1;

        let records = page_records(body)?;
        if records.is_empty() {
            debug!(
                "Empty page received from {} after {} pages",
                self.endpoint,
                self.next - 1
            );
            self.done = true;
            return Ok(None);
        }

        debug!("Received {} records in page {}", records.len(), self.next - 1);
        Ok(Some(records))
    }

    /// Fetch every remaining page and concatenate the records
    pub async fn collect_all(mut self, api: &dyn BackupApi) -> FetcherResult<Vec<Value>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page(api).await? {
            all.extend(page);
        }
        Ok(all)
    }
}

/// Extract the `data` array of a listing response
///
/// A missing or null `data` is an empty page.
pub fn page_records(body: Value) -> FetcherResult<Vec<Value>> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Err(FetcherError::ParseError(format!(
                "expected data to be an array, got {other}"
            ))),
        },
        other => Err(FetcherError::ParseError(format!(
            "expected a JSON object response, got {other}"
        ))),
    }
}
