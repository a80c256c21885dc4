//! Heuristic citation parsing.
//!
//! Three pattern variants are tried in a fixed order, each exposing the same
//! attempt contract. Keeping the fallback chain as an explicit ordered list
//! makes each grammar independently testable and lets new grammars slot in
//! without touching callers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{CitationBlock, ParsedCitation, ResolveError};

/// The three supported citation grammars, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationPattern {
    /// `<authors>, "<title>,"` optionally followed by venue text.
    QuotedTitle,
    /// Author list, comma-delimited title, then a venue tail carrying a
    /// year/volume/page marker.
    UnquotedTitle,
    /// Authors and venue only; no recoverable title.
    AuthorsOnly,
}

const ALL_PATTERNS: [CitationPattern; 3] = [
    CitationPattern::QuotedTitle,
    CitationPattern::UnquotedTitle,
    CitationPattern::AuthorsOnly,
];

/// Venue tail alternatives shared by the unquoted grammars. A venue is
/// recognized by a year in parentheses ("Nucl. Phys. B 160 (1979) 349"),
/// a trailing ", YYYY" journal form, a bare year, or an eprint tag.
const VENUE_TAIL: &str = r"(?:[^,]*\((?:19|20)\d{2}\)[^,]*|[^,]+,\s*\(?(?:19|20)\d{2}\)?[^,]*|(?:19|20)\d{2}[^,]*|\[?(?i:arxiv)[:.]\S+.*)";

impl CitationPattern {
    /// 1-based index used by the `--pattern` CLI flag and error messages.
    pub fn index(&self) -> u8 {
        match self {
            Self::QuotedTitle => 1,
            Self::UnquotedTitle => 2,
            Self::AuthorsOnly => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::QuotedTitle),
            2 => Some(Self::UnquotedTitle),
            3 => Some(Self::AuthorsOnly),
            _ => None,
        }
    }

    /// Attempt this grammar against the citation text.
    ///
    /// Returns `None` when the regex does not match or the match yields no
    /// author token, so the caller can fall through to the next variant.
    fn attempt(&self, text: &str) -> Option<ParsedCitation> {
        match self {
            Self::QuotedTitle => {
                static RE: Lazy<Regex> = Lazy::new(|| {
                    Regex::new(
                        r#"^(?P<authors>[^"“”]+),\s*["“](?P<title>[^"“”]+?)\s*[,.]?\s*["”].*$"#,
                    )
                    .unwrap()
                });
                let caps = RE.captures(text)?;
                let authors = normalize_authors(&caps["authors"]);
                let title = clean_title(&caps["title"]);
                if authors.is_empty() || title.is_empty() {
                    return None;
                }
                Some(ParsedCitation {
                    authors,
                    title: Some(title),
                    pattern_used: *self,
                })
            }
            Self::UnquotedTitle => {
                static RE: Lazy<Regex> = Lazy::new(|| {
                    Regex::new(&format!(
                        r"^(?P<authors>.+?\s+and\s+[^,]+|[A-Z][^,]*,\s*(?:[A-Z]\.\s*)+|[^,]+),\s*(?P<title>.+?),\s*(?P<venue>{VENUE_TAIL})$"
                    ))
                    .unwrap()
                });
                let caps = RE.captures(text)?;
                let title = clean_title(&caps["title"]);
                // A bare "Surname, I." segment is a continuation of the
                // author list, not a title; hand the block to AuthorsOnly.
                if looks_like_author_entry(&title) {
                    return None;
                }
                let authors = normalize_authors(&caps["authors"]);
                if authors.is_empty() || title.is_empty() {
                    return None;
                }
                Some(ParsedCitation {
                    authors,
                    title: Some(title),
                    pattern_used: *self,
                })
            }
            Self::AuthorsOnly => {
                static RE: Lazy<Regex> = Lazy::new(|| {
                    Regex::new(&format!(
                        r"^(?P<authors>.+?),\s*(?P<venue>{VENUE_TAIL})$"
                    ))
                    .unwrap()
                });
                let caps = RE.captures(text)?;
                let authors = normalize_authors(&caps["authors"]);
                if authors.is_empty() {
                    return None;
                }
                Some(ParsedCitation {
                    authors,
                    title: None,
                    pattern_used: *self,
                })
            }
        }
    }
}

/// Parse a citation block into structured author/title data.
///
/// Semicolon-separated blocks bundle several citations under one marker;
/// `inner_refnum` selects one of them (1-indexed over the full split).
/// Patterns are tried in order `1 → 2 → 3` unless `pattern_override` forces
/// a single grammar, in which case a non-match is a hard `ParseFailure`
/// rather than a silent fallback.
pub fn parse(
    block: &CitationBlock,
    pattern_override: Option<CitationPattern>,
    inner_refnum: usize,
) -> Result<ParsedCitation, ResolveError> {
    let text = strip_marker(&block.raw_text);

    let segments: Vec<&str> = text.split(';').collect();
    if inner_refnum == 0 || inner_refnum > segments.len() {
        return Err(ResolveError::InvalidInnerReference {
            requested: inner_refnum,
            available: segments.len(),
        });
    }
    let segment = segments[inner_refnum - 1].trim();

    if let Some(pattern) = pattern_override {
        return pattern
            .attempt(segment)
            .ok_or(ResolveError::ParseFailure {
                pattern: pattern.index(),
            });
    }

    for pattern in ALL_PATTERNS {
        if let Some(parsed) = pattern.attempt(segment) {
            tracing::debug!(pattern = parsed.pattern_used.index(), "citation parsed");
            return Ok(parsed);
        }
    }
    Err(ResolveError::NoParseableCitation)
}

/// Drop the leading `[N]` / `[SN]` marker token.
fn strip_marker(raw: &str) -> String {
    static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[S?\d+\]\s*").unwrap());
    MARKER_RE.replace(raw, "").trim().to_string()
}

/// Split captured author text on commas and the word "and", keeping the
/// first alphabetic run of length >= 2 in each entry as the surname.
/// Initial-only entries ("J.", "A.") are discarded, which keeps search
/// terms short and avoids false negatives from variant initial formatting.
fn normalize_authors(raw: &str) -> Vec<String> {
    static SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),|;|&|\band\b").unwrap());
    static SURNAME_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\p{L}{2,}(?:[-'’]\p{L}+)*").unwrap());

    SPLIT_RE
        .split(raw)
        .filter_map(|entry| SURNAME_RE.find(entry).map(|m| m.as_str().to_string()))
        .collect()
}

fn clean_title(raw: &str) -> String {
    raw.trim().trim_matches(['"', '“', '”', ',', '.']).trim().to_string()
}

/// Matches entries like "Doe, A." or "Doe" that the unquoted-title grammar
/// can mistake for a title.
fn looks_like_author_entry(candidate: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Z][\p{L}'’-]+(?:,\s*(?:[A-Z]\.?\s*)+)?$").unwrap());
    RE.is_match(candidate)
}
