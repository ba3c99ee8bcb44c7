//! SerpAPI backend: Google results as JSON.
//!
//! One GET to the JSON search endpoint with the configured locale bias.
//! Result links are taken in the API's ranking order.

use crate::config::SearchConfig;
use crate::engine::SourceFinder;
use crate::error::SearchError;
use crate::http;
use crate::types::SourceList;
use serde_json::Value;

/// SerpAPI JSON search client.
pub struct SerpApiEngine {
    config: SearchConfig,
    client: reqwest::Client,
}

impl SerpApiEngine {
    /// Create an engine from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = http::build_search_client(&config)?;
        Ok(Self { config, client })
    }

    fn query_params<'a>(&'a self, query: &'a str, num: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("engine", self.config.engine.as_str()),
            ("q", query),
            ("api_key", self.config.api_key.as_str()),
            ("num", num),
            ("gl", self.config.country.as_str()),
            ("hl", self.config.language.as_str()),
        ];
        if let Some(location) = self.config.location.as_deref() {
            params.push(("location", location));
        }
        params
    }
}

impl SourceFinder for SerpApiEngine {
    async fn find_sources(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<SourceList, SearchError> {
        tracing::trace!(query, max_results, "SerpAPI search");

        let num = max_results.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&self.query_params(query, &num))
            .send()
            .await
            .map_err(|e| http::describe(e, "search request failed"))?
            .error_for_status()
            .map_err(|e| http::describe(e, "search API error status"))?;

        let body = response
            .text()
            .await
            .map_err(|e| http::describe(e, "search response read failed"))?;

        tracing::trace!(bytes = body.len(), "SerpAPI response received");

        parse_serpapi_json(&body, max_results)
    }

    fn max_results(&self) -> usize {
        self.config.max_results
    }
}

/// Parse a SerpAPI JSON body into a [`SourceList`].
///
/// Takes the first `max_results` organic results and skips entries without
/// a non-empty `link`, so a list may come back shorter than the cap.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not JSON or carries no
/// `organic_results` array.
pub(crate) fn parse_serpapi_json(body: &str, max_results: usize) -> Result<SourceList, SearchError> {
    let data: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("search response is not JSON: {e}")))?;

    let organic = data
        .get("organic_results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Parse("search response has no organic_results".into()))?;

    let links = organic
        .iter()
        .take(max_results)
        .filter_map(|result| result.get("link").and_then(Value::as_str))
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_owned);

    Ok(SourceList::new(links, max_results))
}
