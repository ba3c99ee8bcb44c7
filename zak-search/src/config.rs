//! Source lookup and page fetch configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the search API call; [`FetchConfig`] controls how
//! candidate pages are retrieved. Both are constructed once at startup and
//! passed by reference into the components that need them.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default search API endpoint (SerpAPI JSON search).
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Configuration for the search API call that produces a [`SourceList`].
///
/// The locale bias (`language`, `country`, `location`) is a deliberate
/// deployment default rather than a per-question parameter.
///
/// [`SourceList`]: crate::types::SourceList
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search API key. Required; validated at startup.
    pub api_key: String,
    /// Search API endpoint URL.
    pub endpoint: String,
    /// Search engine requested from the API.
    pub engine: String,
    /// Maximum number of candidate URLs per question.
    pub max_results: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Interface language bias (`hl`).
    pub language: String,
    /// Country bias (`gl`).
    pub country: String,
    /// Optional free-text location bias.
    pub location: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_owned(),
            engine: "google".to_owned(),
            max_results: 5,
            timeout_seconds: 10,
            language: "en".to_owned(),
            country: "IN".to_owned(),
            location: Some("India".to_owned()),
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("engine", &self.engine)
            .field("max_results", &self.max_results)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("language", &self.language)
            .field("country", &self.country)
            .field("location", &self.location)
            .finish()
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `api_key` must not be blank
    /// - `max_results` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `endpoint` must be an absolute URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Config("search api_key is not set".into()));
        }
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "search timeout_seconds must be greater than 0".into(),
            ));
        }
        if url::Url::parse(&self.endpoint).is_err() {
            return Err(SearchError::Config(format!(
                "search endpoint is not a valid URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

/// Which strategy retrieves page markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Plain HTTP GET. Fast, but misses JavaScript-rendered content.
    #[default]
    Http,
    /// Headless Chromium navigation. Slower, renders the DOM first.
    Browser,
}

impl FetchStrategy {
    /// Parses a strategy name (`http` or `browser`, case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" => Some(Self::Http),
            "browser" => Some(Self::Browser),
            _ => None,
        }
    }

    /// Returns the lowercase strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Browser => "browser",
        }
    }

    /// Whether this build can run the strategy.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Http => true,
            Self::Browser => cfg!(feature = "browser"),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Headless browser settings, used when [`FetchStrategy::Browser`] is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Page-load timeout in seconds.
    pub page_load_timeout_seconds: u64,
    /// Fixed delay after navigation so late scripts can settle.
    pub settle_delay_ms: u64,
    /// Chromium executable. If `None`, the driver searches the usual locations.
    pub executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_load_timeout_seconds: 5,
            settle_delay_ms: 1_000,
            executable: None,
        }
    }
}

/// Configuration for retrieving candidate pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Static HTTP or headless browser.
    pub strategy: FetchStrategy,
    /// Per-page HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum pages in flight at once. `1` fetches sequentially.
    pub concurrency: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Headless browser settings.
    pub browser: BrowserConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::Http,
            timeout_seconds: 10,
            concurrency: 4,
            user_agent: None,
            browser: BrowserConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "fetch timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(SearchError::Config(
                "fetch concurrency must be greater than 0".into(),
            ));
        }
        if self.strategy == FetchStrategy::Browser {
            if !self.strategy.is_available() {
                return Err(SearchError::Config(
                    "browser fetch strategy requires the `browser` feature".into(),
                ));
            }
            if self.browser.page_load_timeout_seconds == 0 {
                return Err(SearchError::Config(
                    "browser page_load_timeout_seconds must be greater than 0".into(),
                ));
            }
        }
        Ok(())
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
