//! Request orchestration: question → sources → corpus → answer.
//!
//! [`QueryPipeline::run`] walks `Init → SourcesFound → ContentAggregated →
//! Answered`, short-circuiting to a terminal [`PipelineOutcome`] as soon as a
//! stage has nothing to pass on. Each run owns all of its data; the pipeline
//! itself only holds immutable collaborators and can be shared across
//! concurrent requests behind an `Arc`.

use crate::answer::AnswerComposer;
use crate::error::{QaError, Result};
use std::fmt;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use zak_search::{PageSourceFactory, SourceFinder};

/// Answer returned when the search API produced no usable links.
pub const NO_SOURCES_ANSWER: &str = "❌ No search results found.";

/// Answer returned when none of the pages yielded any text.
pub const NO_CONTENT_ANSWER: &str = "❌ No content could be extracted from links.";

/// A validated, trimmed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
}

impl Query {
    /// # Errors
    ///
    /// Returns [`QaError::BadRequest`] if `text` is empty after trimming.
    pub fn new(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QaError::BadRequest("question is empty".into()));
        }
        Ok(Self {
            text: text.to_owned(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Non-terminal stages of a run, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SourcesFound,
    ContentAggregated,
    Answered,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SourcesFound => "sources_found",
            Self::ContentAggregated => "content_aggregated",
            Self::Answered => "answered",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The question was blank; nothing was called.
    BadRequest,
    /// The search produced no sources.
    NoSources,
    /// Every page failed or yielded no text.
    NoContent,
    /// The composer produced an answer (possibly a provider error message).
    Answered(String),
    /// The caller went away before the run finished.
    Cancelled,
}

impl PipelineOutcome {
    /// Text to send back to the caller, if the outcome carries any.
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Answered(text) => Some(text),
            Self::NoSources => Some(NO_SOURCES_ANSWER),
            Self::NoContent => Some(NO_CONTENT_ANSWER),
            Self::BadRequest | Self::Cancelled => None,
        }
    }
}

/// The retrieve → extract → aggregate → compose orchestrator.
pub struct QueryPipeline<F, P, C> {
    finder: F,
    pages: P,
    composer: C,
    concurrency: usize,
}

impl<F, P, C> QueryPipeline<F, P, C>
where
    F: SourceFinder,
    P: PageSourceFactory,
    C: AnswerComposer,
{
    /// `concurrency` bounds page fetches in flight; 1 fetches sequentially.
    pub fn new(finder: F, pages: P, composer: C, concurrency: usize) -> Self {
        Self {
            finder,
            pages,
            composer,
            concurrency: concurrency.max(1),
        }
    }

    /// Answer one question.
    ///
    /// Never fails: every failure below this point degrades into one of the
    /// terminal outcomes. When `cancel` fires the run stops at the next stage
    /// boundary (or mid-aggregation) and reports [`PipelineOutcome::Cancelled`].
    pub async fn run(&self, question: &str, cancel: &CancellationToken) -> PipelineOutcome {
        let started = Instant::now();
        let query = match Query::new(question) {
            Ok(query) => query,
            Err(err) => {
                tracing::info!(stage = %Stage::Init, error = %err, "rejecting request");
                return PipelineOutcome::BadRequest;
            }
        };
        tracing::trace!(question = query.text(), "pipeline started");

        let sources = tokio::select! {
            biased;
            () = cancel.cancelled() => return self.cancelled(Stage::Init),
            sources = zak_search::find_sources(&self.finder, query.text()) => sources,
        };
        tracing::info!(
            stage = %Stage::SourcesFound,
            sources = sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage complete"
        );
        if sources.is_empty() {
            return PipelineOutcome::NoSources;
        }

        let corpus =
            zak_search::collect_corpus(&self.pages, &sources, self.concurrency, cancel).await;
        if cancel.is_cancelled() {
            return self.cancelled(Stage::SourcesFound);
        }
        tracing::info!(
            stage = %Stage::ContentAggregated,
            pages = corpus.page_count(),
            fragments = corpus.fragment_count(),
            chars = corpus.as_str().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage complete"
        );
        if corpus.is_blank() {
            return PipelineOutcome::NoContent;
        }

        let answer = tokio::select! {
            biased;
            () = cancel.cancelled() => return self.cancelled(Stage::ContentAggregated),
            answer = self.composer.compose(&query, &sources, &corpus) => answer,
        };
        tracing::info!(
            stage = %Stage::Answered,
            answer_chars = answer.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage complete"
        );
        PipelineOutcome::Answered(answer)
    }

    fn cancelled(&self, after: Stage) -> PipelineOutcome {
        tracing::info!(stage = %after, "pipeline cancelled");
        PipelineOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use zak_search::{Corpus, FetchResult, PageSource, SearchError, SourceList};

    #[derive(Default)]
    struct Calls {
        search: AtomicUsize,
        fetch: AtomicUsize,
        compose: AtomicUsize,
    }

    struct StubFinder {
        urls: Vec<String>,
        calls: Arc<Calls>,
    }

    impl SourceFinder for StubFinder {
        async fn find_sources(&self, _query: &str, max: usize) -> zak_search::Result<SourceList> {
            self.calls.search.fetch_add(1, Ordering::SeqCst);
            Ok(SourceList::new(self.urls.clone(), max))
        }

        fn max_results(&self) -> usize {
            5
        }
    }

    #[derive(Clone)]
    struct StubPages {
        pages: Arc<HashMap<String, String>>,
        delay: Duration,
        calls: Arc<Calls>,
    }

    impl PageSource for StubPages {
        async fn fetch(&self, url: &str) -> FetchResult {
            self.calls.fetch.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| SearchError::Http(format!("404 for {url}")))
        }
    }

    impl PageSourceFactory for StubPages {
        type Source = Self;

        async fn acquire(&self) -> zak_search::Result<Self> {
            Ok(self.clone())
        }
    }

    struct RecordingComposer {
        calls: Arc<Calls>,
        seen: Mutex<Option<(String, Vec<String>, String)>>,
    }

    impl AnswerComposer for RecordingComposer {
        async fn compose(&self, query: &Query, sources: &SourceList, corpus: &Corpus) -> String {
            self.calls.compose.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some((
                query.text().to_owned(),
                sources.urls().to_vec(),
                corpus.as_str().to_owned(),
            ));
            "The capital of France is Paris.".to_owned()
        }
    }

    type TestPipeline = QueryPipeline<StubFinder, StubPages, RecordingComposer>;

    fn pipeline(urls: &[&str], pages: &[(&str, &str)], delay_ms: u64) -> (TestPipeline, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let finder = StubFinder {
            urls: urls.iter().map(|u| (*u).to_owned()).collect(),
            calls: Arc::clone(&calls),
        };
        let pages = StubPages {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(u, html)| ((*u).to_owned(), (*html).to_owned()))
                    .collect(),
            ),
            delay: Duration::from_millis(delay_ms),
            calls: Arc::clone(&calls),
        };
        let composer = RecordingComposer {
            calls: Arc::clone(&calls),
            seen: Mutex::new(None),
        };
        (QueryPipeline::new(finder, pages, composer, 4), calls)
    }

    #[test]
    fn query_trims_and_rejects_blank() {
        assert_eq!(Query::new("  hi \n").unwrap().text(), "hi");
        assert!(matches!(Query::new(" \t\n"), Err(QaError::BadRequest(_))));
        assert!(Query::new("").is_err());
    }

    #[tokio::test]
    async fn blank_question_makes_no_calls() {
        let (pipeline, calls) = pipeline(&["http://a"], &[("http://a", "<p>x</p>")], 0);
        let outcome = pipeline.run("   ", &CancellationToken::new()).await;
        assert_eq!(outcome, PipelineOutcome::BadRequest);
        assert_eq!(outcome.answer(), None);
        assert_eq!(calls.search.load(Ordering::SeqCst), 0);
        assert_eq!(calls.fetch.load(Ordering::SeqCst), 0);
        assert_eq!(calls.compose.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_sources_skips_fetch_and_compose() {
        let (pipeline, calls) = pipeline(&[], &[], 0);
        let outcome = pipeline.run("obscure", &CancellationToken::new()).await;
        assert_eq!(outcome, PipelineOutcome::NoSources);
        assert_eq!(outcome.answer(), Some(NO_SOURCES_ANSWER));
        assert_eq!(calls.search.load(Ordering::SeqCst), 1);
        assert_eq!(calls.fetch.load(Ordering::SeqCst), 0);
        assert_eq!(calls.compose.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_fetches_failing_skips_compose() {
        let (pipeline, calls) = pipeline(&["http://a", "http://b"], &[], 0);
        let outcome = pipeline.run("anything", &CancellationToken::new()).await;
        assert_eq!(outcome, PipelineOutcome::NoContent);
        assert_eq!(outcome.answer(), Some(NO_CONTENT_ANSWER));
        assert_eq!(calls.fetch.load(Ordering::SeqCst), 2);
        assert_eq!(calls.compose.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn composer_sees_trimmed_query_sources_and_corpus() {
        let (pipeline, calls) = pipeline(
            &["http://a", "http://b"],
            &[
                ("http://a", "<p>Paris is the capital of France.</p>"),
                ("http://b", "<h2>France</h2>"),
            ],
            0,
        );
        let outcome = pipeline
            .run("  What is the capital of France?  ", &CancellationToken::new())
            .await;
        assert_eq!(
            outcome,
            PipelineOutcome::Answered("The capital of France is Paris.".into())
        );
        assert_eq!(calls.compose.load(Ordering::SeqCst), 1);

        let (question, urls, corpus) = pipeline.composer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(question, "What is the capital of France?");
        assert_eq!(urls, ["http://a", "http://b"]);
        assert_eq!(corpus, "Paris is the capital of France.\nFrance\n");
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_fetch_stops_before_compose() {
        let (pipeline, calls) = pipeline(&["http://a"], &[("http://a", "<p>late</p>")], 60_000);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });
        let outcome = pipeline.run("q", &cancel).await;
        assert_eq!(outcome, PipelineOutcome::Cancelled);
        assert_eq!(calls.compose.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_before_start_makes_no_search() {
        let (pipeline, calls) = pipeline(&["http://a"], &[], 0);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(pipeline.run("q", &cancel).await, PipelineOutcome::Cancelled);
        assert_eq!(calls.search.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::SourcesFound.to_string(), "sources_found");
        assert_eq!(Stage::Answered.name(), "answered");
    }
}
