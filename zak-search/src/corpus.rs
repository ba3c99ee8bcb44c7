//! Corpus aggregation: fetch every source, extract fragments, concatenate.
//!
//! Pages are fetched with bounded concurrency but consumed strictly in
//! [`SourceList`] order, so the corpus never depends on which page answered
//! first. A failed page is logged and skipped; aggregation itself never fails.

use crate::content::ParsedPage;
use crate::fetch::{PageSource, PageSourceFactory};
use crate::types::{FetchResult, Fragment, SourceList};
use futures::StreamExt;
use std::fmt::Write as _;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Aggregated text for one request: every fragment, newline-terminated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    fragments: usize,
    pages: usize,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment followed by a newline.
    pub fn push(&mut self, fragment: &Fragment) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.text, "{fragment}");
        self.fragments += 1;
    }

    /// Append every fragment of one page and count the page as contributing.
    pub fn extend_page(&mut self, fragments: impl IntoIterator<Item = Fragment>) -> usize {
        let before = self.fragments;
        for fragment in fragments {
            self.push(&fragment);
        }
        let added = self.fragments - before;
        if added > 0 {
            self.pages += 1;
        }
        added
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the corpus carries no usable content (empty or whitespace only).
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }
}

/// Fetch and extract every source through `source`, in list order.
///
/// At most `concurrency` fetches are in flight. When `cancel` fires, fetches
/// still in flight are dropped and the corpus collected so far is returned.
pub async fn aggregate<S: PageSource>(
    sources: &SourceList,
    source: &S,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Corpus {
    let started = Instant::now();
    let fetches: Vec<_> = sources
        .iter()
        .map(|url| fetch_one(source, url.clone()))
        .collect();
    let mut outcomes = futures::stream::iter(fetches).buffered(concurrency.max(1));

    let mut corpus = Corpus::new();
    let mut failed = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("aggregation cancelled; dropping in-flight fetches");
                break;
            }
            next = outcomes.next() => next,
        };
        let Some((url, outcome)) = next else {
            break;
        };

        match outcome {
            Ok(markup) => {
                let page = ParsedPage::parse(&markup);
                let added = corpus.extend_page(page.fragments());
                tracing::debug!(%url, fragments = added, "page extracted");
            }
            Err(err) => {
                failed += 1;
                tracing::warn!(%url, error = %err, "page fetch failed; skipping");
            }
        }
    }

    tracing::info!(
        sources = sources.len(),
        failed,
        pages = corpus.page_count(),
        fragments = corpus.fragment_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "corpus aggregated"
    );
    corpus
}

/// Acquire a request-scoped source, aggregate, and always release it.
///
/// A source that cannot be acquired is treated like every fetch failing:
/// the corpus comes back empty.
pub async fn collect_corpus<F: PageSourceFactory>(
    factory: &F,
    sources: &SourceList,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Corpus {
    let source = match factory.acquire().await {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!(error = %err, "page source unavailable; no pages fetched");
            return Corpus::new();
        }
    };
    let corpus = aggregate(sources, &source, concurrency, cancel).await;
    factory.release(source).await;
    corpus
}

async fn fetch_one<S: PageSource>(source: &S, url: String) -> (String, FetchResult) {
    let outcome = source.fetch(&url).await;
    (url, outcome)
}
