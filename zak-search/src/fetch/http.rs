//! Static page fetching over plain HTTP.

use super::PageSource;
use crate::config::FetchConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::FetchResult;

/// Fetches pages with a single GET using a browser-like User-Agent.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Build a source with the configured timeout and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &FetchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_page_client(config)?,
        })
    }
}

impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> FetchResult {
        tracing::trace!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http::describe(e, "page request failed"))?
            .error_for_status()
            .map_err(|e| http::describe(e, "page returned error status"))?;

        let body = response
            .text()
            .await
            .map_err(|e| http::describe(e, "page body read failed"))?;

        tracing::trace!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}
