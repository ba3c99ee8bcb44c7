//! Trait definition for pluggable source lookup backends.
//!
//! A [`SourceFinder`] turns a question into ranked candidate URLs. The
//! production backend is [`SerpApiEngine`](crate::engines::SerpApiEngine);
//! tests substitute in-memory finders.

use crate::error::SearchError;
use crate::types::SourceList;

/// A pluggable search backend.
///
/// Implementations make a single attempt per call and report failures as
/// errors; [`find_sources`](crate::find_sources) turns those into an empty
/// list so a lookup failure never aborts a request.
///
/// All implementations must be `Send + Sync` so one finder can serve
/// concurrent requests.
pub trait SourceFinder: Send + Sync {
    /// Look up candidate URLs for `query`, keeping at most `max_results`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on timeout, non-success status, or a response
    /// body that does not carry a result list.
    fn find_sources(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl std::future::Future<Output = Result<SourceList, SearchError>> + Send;

    /// The configured result cap for this backend.
    fn max_results(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFinder {
        urls: Vec<String>,
    }

    impl SourceFinder for FixedFinder {
        async fn find_sources(
            &self,
            _query: &str,
            max_results: usize,
        ) -> Result<SourceList, SearchError> {
            if self.urls.is_empty() {
                return Err(SearchError::Parse("no organic results".into()));
            }
            Ok(SourceList::new(self.urls.clone(), max_results))
        }

        fn max_results(&self) -> usize {
            5
        }
    }

    #[test]
    fn fixed_finder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FixedFinder>();
    }

    #[tokio::test]
    async fn finder_respects_cap() {
        let finder = FixedFinder {
            urls: vec!["https://a".into(), "https://b".into(), "https://c".into()],
        };
        let list = finder.find_sources("q", 2).await.expect("should succeed");
        assert_eq!(list.urls(), ["https://a", "https://b"]);
    }

    #[tokio::test]
    async fn finder_propagates_errors() {
        let finder = FixedFinder { urls: vec![] };
        let err = finder.find_sources("q", 5).await.unwrap_err();
        assert!(err.to_string().contains("no organic results"));
    }
}
