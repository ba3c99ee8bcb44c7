//! Prompt assembly for grounded answers.
//!
//! The model is told to answer from the collected page text only. Source URLs
//! are listed so that "give me links" style questions can be answered without
//! inventing addresses.

use std::borrow::Cow;
use std::fmt::Write as _;
use zak_search::SourceList;

/// Appended when the corpus was cut to fit `max_corpus_chars`.
pub const TRUNCATION_MARKER: &str = "[Content truncated]";

/// Build the full prompt for `question`.
///
/// `max_corpus_chars` caps the embedded corpus in characters (not bytes);
/// `None` embeds it unchanged.
pub fn build_prompt(
    question: &str,
    sources: &SourceList,
    corpus: &str,
    max_corpus_chars: Option<usize>,
) -> String {
    let corpus = match max_corpus_chars {
        Some(limit) => truncate_corpus(corpus, limit),
        None => Cow::Borrowed(corpus),
    };

    let mut prompt = String::with_capacity(corpus.len() + question.len() + 512);
    prompt.push_str(
        "Answer the question below using only the material collected from the web pages listed.\n\n",
    );

    prompt.push_str("=== Source URLs ===\n");
    for url in sources {
        let _ = writeln!(prompt, "- {url}");
    }

    prompt.push_str("\n=== Collected Content ===\n");
    prompt.push_str(&corpus);
    if !corpus.ends_with('\n') {
        prompt.push('\n');
    }

    let _ = write!(
        prompt,
        "\n=== Question ===\n{question}\n\n\
         Instructions:\n\
         - If the question asks for links or sources, reply with the relevant URLs from the list above.\n\
         - Otherwise answer strictly from the collected content. If it does not contain the answer, say so plainly.\n\
         - Do not use outside knowledge.\n\
         - Keep the answer short and direct.\n"
    );
    prompt
}

/// Cut `corpus` to at most `limit` chars on a char boundary and mark the cut.
fn truncate_corpus(corpus: &str, limit: usize) -> Cow<'_, str> {
    match corpus.char_indices().nth(limit) {
        None => Cow::Borrowed(corpus),
        Some((byte_idx, _)) => {
            let mut cut = String::with_capacity(byte_idx + TRUNCATION_MARKER.len() + 2);
            cut.push_str(&corpus[..byte_idx]);
            cut.push('\n');
            cut.push_str(TRUNCATION_MARKER);
            cut.push('\n');
            Cow::Owned(cut)
        }
    }
}
