//! Search query construction and embedded arXiv-identifier detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{CitationBlock, ParsedCitation};

/// Query handed to the search collaborator. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// The citation names the paper unambiguously; fetch it directly and
    /// skip keyword search and fuzzy ranking entirely.
    Lookup { arxiv_id: String },
    Keywords {
        author_terms: Vec<String>,
        title_terms: Vec<String>,
    },
}

/// Extract an arXiv ID embedded in citation text.
///
/// Handles:
/// - `arXiv:2301.12345` / `arXiv:2301.12345v1` (new format)
/// - `arxiv.org/abs/2301.12345`
/// - `arXiv:hep-th/9901001` and bare `hep-th/9901001` (old format)
///
/// IDs split across a line break by PDF extraction are rejoined first.
pub fn find_arxiv_id(text: &str) -> Option<String> {
    static FIX_SPLIT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)(arxiv:\d{4}\.)\s*\n\s*(\d+)").unwrap());
    let text = FIX_SPLIT.replace_all(text, "$1$2");

    // New format: YYMM.NNNNN with optional version
    static NEW_FMT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)ar-?xiv[:\s]+(\d{4}\.\d{4,5}(?:v\d+)?)").unwrap());
    if let Some(caps) = NEW_FMT.captures(&text) {
        return Some(caps[1].to_string());
    }

    // URL format
    static URL_FMT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)arxiv\.org/(?:abs|pdf)/(\d{4}\.\d{4,5}(?:v\d+)?)").unwrap());
    if let Some(caps) = URL_FMT.captures(&text) {
        return Some(caps[1].to_string());
    }

    // Old format: category/YYMMNNN, with or without the arXiv: prefix
    static OLD_FMT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)(?:ar-?xiv[:\s/]|arxiv\.org/abs/|^|[\s\[(])([a-z]+(?:-[a-z]+)?/\d{7}(?:v\d+)?)").unwrap()
    });
    if let Some(caps) = OLD_FMT.captures(&text) {
        return Some(caps[1].to_string());
    }

    None
}

/// Whether a CLI-supplied source string is itself an arXiv identifier.
pub fn is_arxiv_id(source: &str) -> bool {
    static NEW_FMT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\d{4}\.\d{4,5}(?:v\d+)?$").unwrap());
    static OLD_FMT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-z]+(?:-[a-z]+)?/\d{7}(?:v\d+)?$").unwrap());
    NEW_FMT.is_match(source) || OLD_FMT.is_match(source)
}

/// Build the search query for a citation.
///
/// An embedded arXiv ID wins over everything else. Otherwise author
/// surnames become `au:` terms (longest first, so the most selective name
/// leads the query) and the title is reduced to its significant words.
pub fn build(block: &CitationBlock, parsed: &ParsedCitation) -> SearchQuery {
    if let Some(arxiv_id) = find_arxiv_id(&block.raw_text) {
        tracing::debug!(%arxiv_id, "citation carries an explicit identifier");
        return SearchQuery::Lookup { arxiv_id };
    }

    let mut author_terms = parsed.authors.clone();
    author_terms.sort_by_key(|a| std::cmp::Reverse(a.len()));

    let title_terms = parsed
        .title
        .as_deref()
        .map(significant_words)
        .unwrap_or_default();

    SearchQuery::Keywords {
        author_terms,
        title_terms,
    }
}

/// Tokenize a title into search terms. Single-character tokens are noise
/// for the search API and the word "and" matches everything, so both are
/// dropped.
fn significant_words(title: &str) -> Vec<String> {
    static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]{2,}").unwrap());
    WORD_RE
        .find_iter(title)
        .map(|m| m.as_str().to_string())
        .filter(|w| !w.eq_ignore_ascii_case("and"))
        .collect()
}
