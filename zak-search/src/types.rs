//! Core value types: candidate sources, fetch outcomes and extracted fragments.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered candidate URLs for one question, in the search API's ranking order.
///
/// Built once per question and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceList {
    urls: Vec<String>,
}

impl SourceList {
    /// Builds a list from ranked URLs, keeping at most `cap` of them.
    pub fn new(urls: impl IntoIterator<Item = String>, cap: usize) -> Self {
        Self {
            urls: urls.into_iter().take(cap).collect(),
        }
    }

    /// An empty list, the outcome of a failed lookup.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The URLs in ranking order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.urls.iter()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

/// Outcome of fetching one URL: raw markup, or the reason it was skipped.
pub type FetchResult = Result<String, SearchError>;

/// One normalized line of extracted page content.
///
/// The [`Display`](fmt::Display) form is the line written into the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    /// Heading or paragraph prose.
    Text(String),
    /// Absolute hyperlink, rendered as a markdown link.
    Link { label: String, href: String },
    /// Table row cells in document order, rendered tab-joined.
    TableRow(Vec<String>),
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Link { label, href } => write!(f, "[{label}]({href})"),
            Self::TableRow(cells) => f.write_str(&cells.join("\t")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_list_caps_and_keeps_order() {
        let urls = ["https://a", "https://b", "https://c"].map(String::from);
        let list = SourceList::new(urls, 2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.urls(), ["https://a", "https://b"]);
    }

    #[test]
    fn empty_source_list() {
        let list = SourceList::empty();
        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn text_fragment_display() {
        let fragment = Fragment::Text("Paris is the capital.".into());
        assert_eq!(fragment.to_string(), "Paris is the capital.");
    }

    #[test]
    fn link_fragment_display() {
        let fragment = Fragment::Link {
            label: "Docs".into(),
            href: "https://example.com/docs".into(),
        };
        assert_eq!(fragment.to_string(), "[Docs](https://example.com/docs)");
    }

    #[test]
    fn table_row_keeps_empty_cells_as_tab_slots() {
        let fragment = Fragment::TableRow(vec![String::new(), "x".into(), String::new()]);
        assert_eq!(fragment.to_string(), "\tx\t");
    }
}
