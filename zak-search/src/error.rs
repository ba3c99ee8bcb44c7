//! Error types for the zak-search crate.
//!
//! All errors use stable string messages suitable for logging. No API keys
//! or request URLs carrying secrets appear in error messages.

/// Errors that can occur while finding, fetching or extracting sources.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An operation exceeded its configured deadline.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A response body could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Headless browser launch, navigation or teardown failed.
    #[error("browser error: {0}")]
    Browser(String),
}

/// Convenience type alias for zak-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
