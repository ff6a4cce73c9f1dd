//! crates/wordflow_core/src/extract.rs
//!
//! Turns a paged document into one flat token stream plus the token range
//! each page occupies. Token indices produced here are persisted as reading
//! positions, so the stream must be built in page order and never re-indexed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tokenizer::tokenize;

/// Failure to read the underlying document. Extraction never returns partial
/// results: any page failing aborts the whole document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Error extracting text from PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Error extracting text from PDF: the document is encrypted")]
    Encrypted,
    #[error("Error extracting text from PDF: page {page}: {reason}")]
    Page { page: usize, reason: String },
}

/// Anything that can hand out raw text page by page.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the page at `index` (0-based). `None` when the page has no
    /// text layer.
    fn page_text(&self, index: usize) -> Result<Option<String>, ExtractionError>;
}

impl PageSource for Vec<Option<String>> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> Result<Option<String>, ExtractionError> {
        self.get(index).cloned().ok_or_else(|| ExtractionError::Page {
            page: index + 1,
            reason: "page does not exist".to_string(),
        })
    }
}

/// The token range contributed by one source page.
///
/// `end` is the index of the page's last token, or equal to `start` when the
/// page contributed nothing. `count` tells the two cases apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBoundary {
    pub page: usize,
    pub start: usize,
    pub end: usize,
    pub count: usize,
}

impl PageBoundary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether the token at `index` was emitted by this page.
    pub fn contains(&self, index: usize) -> bool {
        !self.is_empty() && (self.start..=self.end).contains(&index)
    }
}

/// The result of running a document through the tokenizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub tokens: Vec<String>,
    pub pages: Vec<PageBoundary>,
}

impl Extraction {
    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when no page yielded a single token (e.g. a scanned PDF).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Tokenizes every page of `source` in order.
pub fn extract<S: PageSource + ?Sized>(source: &S) -> Result<Extraction, ExtractionError> {
    let page_count = source.page_count();
    let mut tokens = Vec::new();
    let mut pages = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let start = tokens.len();
        if let Some(text) = source.page_text(index)? {
            tokens.extend(tokenize(&text));
        }
        let cursor = tokens.len();
        let end = if cursor > start { cursor - 1 } else { start };

        pages.push(PageBoundary {
            page: index + 1,
            start,
            end,
            count: cursor - start,
        });
    }

    debug!(pages = page_count, words = tokens.len(), "Extraction finished");
    Ok(Extraction { tokens, pages })
}
