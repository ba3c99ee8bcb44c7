//! HTML content extraction: turns one page into normalized text fragments.
//!
//! Parsing produces a typed view of the elements we care about
//! ([`ElementKind`]); fragments are then produced lazily in two passes:
//!
//! 1. headings, paragraphs and absolute links in document order
//! 2. table rows, table by table, row by row
//!
//! Extraction never fails visibly. If a pass cannot run, the other pass
//! still yields its fragments.

use crate::types::Fragment;
use scraper::{ElementRef, Html, Selector};

/// Prose starting with this prefix is treated as byline noise.
pub const BYLINE_PREFIX: &str = "By ";

const PROSE_SELECTOR: &str = "h1, h2, h3, p, a[href]";

/// Whether `text` is usable content: non-empty once trimmed and not a byline.
///
/// This is the single predicate applied wherever text is considered usable.
pub fn is_valid_text(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.starts_with(BYLINE_PREFIX)
}

/// Element categories the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `h1`–`h3`.
    Heading,
    /// `p`.
    Paragraph,
    /// `a`.
    Link,
    /// `th` or `td`.
    TableCell,
}

impl ElementKind {
    /// Classify an element by its lowercase tag name.
    pub fn classify(tag: &str) -> Option<Self> {
        match tag {
            "h1" | "h2" | "h3" => Some(Self::Heading),
            "p" => Some(Self::Paragraph),
            "a" => Some(Self::Link),
            "th" | "td" => Some(Self::TableCell),
            _ => None,
        }
    }
}

/// A parsed page ready for fragment extraction.
///
/// Holds the parsed document, so it is not `Send`; parse, drain
/// [`fragments`](Self::fragments) and drop it without awaiting in between.
pub struct ParsedPage {
    document: Html,
    prose: Option<Selector>,
    tables: Option<TableSelectors>,
}

struct TableSelectors {
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl TableSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            table: compile("table")?,
            row: compile("tr")?,
            cell: compile("th, td")?,
        })
    }
}

impl ParsedPage {
    /// Parse raw markup. Malformed HTML is repaired by the parser, never rejected.
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
            prose: compile(PROSE_SELECTOR),
            tables: TableSelectors::new(),
        }
    }

    /// Lazily yield this page's fragments: prose and links first, then table rows.
    pub fn fragments(&self) -> impl Iterator<Item = Fragment> + '_ {
        self.prose_fragments().chain(self.table_fragments())
    }

    fn prose_fragments(&self) -> impl Iterator<Item = Fragment> + '_ {
        self.prose
            .iter()
            .flat_map(move |selector| self.document.select(selector))
            .filter_map(element_fragment)
    }

    fn table_fragments(&self) -> impl Iterator<Item = Fragment> + '_ {
        self.tables.iter().flat_map(move |sel| {
            self.document
                .select(&sel.table)
                .flat_map(move |table| table.select(&sel.row))
                .filter_map(move |row| row_fragment(row, &sel.cell))
        })
    }
}

/// Extract all fragments from raw markup.
///
/// Convenience wrapper around [`ParsedPage`] for callers that want an owned list.
pub fn extract_fragments(markup: &str) -> Vec<Fragment> {
    ParsedPage::parse(markup).fragments().collect()
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!(selector, error = ?e, "selector failed to compile; skipping pass");
            None
        }
    }
}

fn element_fragment(element: ElementRef<'_>) -> Option<Fragment> {
    match ElementKind::classify(element.value().name())? {
        ElementKind::Heading | ElementKind::Paragraph => {
            let text = element_text(element);
            is_valid_text(&text).then_some(Fragment::Text(text))
        }
        ElementKind::Link => link_fragment(element),
        ElementKind::TableCell => None,
    }
}

fn link_fragment(element: ElementRef<'_>) -> Option<Fragment> {
    let href = element.value().attr("href")?.trim();
    if !is_fetchable(href) {
        return None;
    }
    let text = element_text(element);
    let label = if text.is_empty() {
        href.to_owned()
    } else {
        text
    };
    Some(Fragment::Link {
        label,
        href: href.to_owned(),
    })
}

fn row_fragment(row: ElementRef<'_>, cell: &Selector) -> Option<Fragment> {
    let cells: Vec<String> = row.select(cell).map(element_text).collect();
    cells
        .iter()
        .any(|text| !text.is_empty())
        .then_some(Fragment::TableRow(cells))
}

/// Absolute `http`/`https` URL check.
fn is_fetchable(href: &str) -> bool {
    url::Url::parse(href)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Text content with runs of whitespace collapsed and ends trimmed.
fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
