//! Answer composition: prompt the language model with the gathered corpus.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiComposer;
pub use prompt::build_prompt;

use crate::pipeline::Query;
use std::future::Future;
use zak_search::{Corpus, SourceList};

/// Turns a question and its corpus into answer text.
///
/// Composition never fails: provider errors are folded into the returned
/// text so the caller always has something to show.
pub trait AnswerComposer: Send + Sync {
    fn compose(
        &self,
        query: &Query,
        sources: &SourceList,
        corpus: &Corpus,
    ) -> impl Future<Output = String> + Send;
}
