//! Error types for the zak service.

/// Top-level error type for question answering.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    /// The caller's question was missing or blank.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Language model request or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Retrieval error surfaced from zak-search.
    #[error(transparent)]
    Search(#[from] zak_search::SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_llm() {
        let err = QaError::Llm("HTTP 503".into());
        assert_eq!(err.to_string(), "LLM error: HTTP 503");
    }

    #[test]
    fn search_errors_pass_through() {
        let err: QaError = zak_search::SearchError::Config("max_results must be > 0".into()).into();
        assert_eq!(err.to_string(), "config error: max_results must be > 0");
    }

    #[test]
    fn io_errors_convert() {
        let err: QaError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
