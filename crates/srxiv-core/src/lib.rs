use thiserror::Error;

pub mod backend;
pub mod block;
pub mod citation;
pub mod locator;
pub mod query;
pub mod ranking;
pub mod session;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use citation::CitationPattern;
pub use query::SearchQuery;
pub use session::{Effect, SessionInput, SessionState};

/// Identifies which occurrence of a bracketed reference marker to resolve.
///
/// Papers frequently reuse reference numbering between a main section and a
/// supplementary section, so `[5]` may appear as a list head more than once.
/// `depth` selects the n-th match counting backward from the end of the
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMarker {
    pub number: u32,
    pub supplementary: bool,
    pub depth: u32,
}

impl ReferenceMarker {
    pub fn new(number: u32, supplementary: bool) -> Self {
        Self {
            number,
            supplementary,
            depth: 1,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// The literal token as it appears in the reference list: `[5]` or `[S5]`.
    pub fn token(&self) -> String {
        if self.supplementary {
            format!("[S{}]", self.number)
        } else {
            format!("[{}]", self.number)
        }
    }

    /// Marker for the next entry in the same reference list.
    pub fn successor(&self) -> Self {
        Self {
            number: self.number + 1,
            supplementary: self.supplementary,
            depth: 1,
        }
    }
}

/// The raw text of one reference-list entry, immutable once extracted.
///
/// `raw_text` starts with the literal marker token and never contains the
/// marker of the following entry. `source_pages` records the (first, last)
/// page indices the block was assembled from.
#[derive(Debug, Clone)]
pub struct CitationBlock {
    pub raw_text: String,
    pub source_pages: (usize, usize),
}

/// Structured author/title data recovered from a citation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCitation {
    /// Surnames in order of appearance; never empty.
    pub authors: Vec<String>,
    /// Stripped of surrounding quotes and punctuation; non-empty when present.
    pub title: Option<String>,
    pub pattern_used: CitationPattern,
}

/// A candidate paper returned by the search collaborator.
///
/// `score` is populated by the ranker; it stays `None` when ranking is
/// skipped because no parsed title was available to compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub score: Option<f64>,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("reference {marker} not found (wanted backward match #{depth}, found {found})")]
    ReferenceNotFound {
        marker: String,
        depth: u32,
        found: u32,
    },
    #[error("reference {marker} vanished from the concatenated page buffer")]
    BlockExtractionFailed { marker: String },
    #[error("inner reference {requested} out of range: block holds {available} semicolon-separated citation(s)")]
    InvalidInnerReference { requested: usize, available: usize },
    #[error("pattern {pattern} did not match the citation text")]
    ParseFailure { pattern: u8 },
    #[error("no citation pattern matched the reference text")]
    NoParseableCitation,
}
