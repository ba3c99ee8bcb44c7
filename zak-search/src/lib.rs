//! # zak-search
//!
//! Retrieval half of zak's grounded question answering: find candidate pages
//! for a question, fetch them, extract normalized text and aggregate it into
//! one corpus for prompting.
//!
//! ## Design
//!
//! - One search API call per question ([`SourceFinder`]), results kept in the
//!   API's ranking order
//! - Pages fetched through a strategy-agnostic [`PageSource`]: plain HTTP, or
//!   headless Chromium behind the `browser` feature
//! - Extraction emits prose lines, markdown links and tab-joined table rows
//! - Bounded parallel fetching with output kept in source order
//! - Graceful degradation: a failed lookup yields no sources, a failed page is
//!   skipped, extraction keeps whatever it managed to collect
//!
//! ## Security
//!
//! - API keys never appear in errors or logs
//! - Questions are logged only at trace level
//! - Nothing is cached between requests

pub mod config;
pub mod content;
pub mod corpus;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetch;
pub mod http;
pub mod types;

pub use config::{BrowserConfig, FetchConfig, FetchStrategy, SearchConfig};
pub use content::{extract_fragments, is_valid_text, ParsedPage};
pub use corpus::{aggregate, collect_corpus, Corpus};
pub use engine::SourceFinder;
pub use engines::SerpApiEngine;
pub use error::{Result, SearchError};
pub use fetch::{ConfiguredPageSource, HttpPageSource, PageFetcher, PageSource, PageSourceFactory};
pub use types::{FetchResult, Fragment, SourceList};

/// Look up candidate sources for `query`, never failing.
///
/// Any lookup error (timeout, error status, malformed body, missing results)
/// is logged and reported as an empty [`SourceList`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> zak_search::Result<()> {
/// let config = zak_search::SearchConfig {
///     api_key: "serpapi-key".into(),
///     ..Default::default()
/// };
/// let engine = zak_search::SerpApiEngine::new(config)?;
/// let sources = zak_search::find_sources(&engine, "capital of France").await;
/// for url in &sources {
///     println!("{url}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn find_sources<F: SourceFinder>(finder: &F, query: &str) -> SourceList {
    match finder.find_sources(query, finder.max_results()).await {
        Ok(sources) => {
            tracing::debug!(count = sources.len(), "sources found");
            sources
        }
        Err(err) => {
            tracing::warn!(error = %err, "source lookup failed; continuing with no sources");
            SourceList::empty()
        }
    }
}
