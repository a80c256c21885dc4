//! Citation block extraction from located pages.

use crate::{CitationBlock, ReferenceMarker, ResolveError};

/// Extract the full citation text for a marker.
///
/// The text of `page_index` and the following page (when present) are
/// concatenated into one buffer before searching, because reference entries
/// frequently run across a page break. The block spans from the marker token
/// up to (excluding) the token of the next entry in the same list, or to the
/// end of the buffer if the entry is the last one.
pub fn extract(
    pages: &[String],
    page_index: usize,
    marker: &ReferenceMarker,
) -> Result<CitationBlock, ResolveError> {
    let mut buffer = pages[page_index].clone();
    let mut last_page = page_index;
    if page_index + 1 < pages.len() {
        buffer.push('\n');
        buffer.push_str(&pages[page_index + 1]);
        last_page = page_index + 1;
    }

    let token = marker.token();
    let start = buffer
        .find(&token)
        .ok_or_else(|| ResolveError::BlockExtractionFailed {
            marker: token.clone(),
        })?;

    let next_token = marker.successor().token();
    let end = buffer[start + token.len()..]
        .find(&next_token)
        .map(|offset| start + token.len() + offset)
        .unwrap_or(buffer.len());

    Ok(CitationBlock {
        raw_text: unwrap_lines(&buffer[start..end]),
        source_pages: (page_index, last_page),
    })
}

/// Rejoin hard-wrapped lines into a single citation string.
///
/// A line ending in `-` is usually a hyphenation artifact and is joined to
/// the next line without the hyphen. When the next line starts with an
/// uppercase letter the hyphen is part of a compound ("non-Hermitian") and
/// is kept. This inevitably turns "non-unitary" into "nonunitary".
fn unwrap_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = String::new();

    for (i, line) in lines.iter().enumerate() {
        let line = line.trim_end();
        if line.ends_with('-') {
            let next_is_upper = lines
                .get(i + 1)
                .and_then(|l| l.trim_start().chars().next())
                .is_some_and(|c| c.is_uppercase());
            if next_is_upper {
                out.push_str(line);
            } else {
                out.push_str(line.trim_end_matches('-'));
            }
        } else {
            out.push_str(line);
            out.push(' ');
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn block_spans_marker_to_next_marker() {
        let pages = pages(&[
            "[1] A. Author, First Title, J. One, 2019.\n[2] B. Writer, Second Title, J. Two, 2020.\n[3] C. Other.",
        ]);
        let block = extract(&pages, 0, &ReferenceMarker::new(2, false)).unwrap();
        assert!(block.raw_text.starts_with("[2]"));
        assert!(block.raw_text.contains("Second Title"));
        assert!(!block.raw_text.contains("[3]"));
    }

    #[test]
    fn block_spans_page_break() {
        let pages = pages(&[
            "[7] D. Splitter, A Title That\nRuns Over The",
            "Page Break, J. Three, 2021.\n[8] E. Next.",
        ]);
        let block = extract(&pages, 0, &ReferenceMarker::new(7, false)).unwrap();
        assert!(block.raw_text.contains("Runs Over The Page Break"));
        assert!(!block.raw_text.contains("[8]"));
        assert_eq!(block.source_pages, (0, 1));
    }

    #[test]
    fn last_entry_runs_to_buffer_end() {
        let pages = pages(&["[12] F. Last, Final Title, J. Four, 2022."]);
        let block = extract(&pages, 0, &ReferenceMarker::new(12, false)).unwrap();
        assert!(block.raw_text.ends_with("2022."));
        assert_eq!(block.source_pages, (0, 0));
    }

    #[test]
    fn missing_marker_is_extraction_failure() {
        let pages = pages(&["no markers at all"]);
        let err = extract(&pages, 0, &ReferenceMarker::new(5, false)).unwrap_err();
        assert!(matches!(err, ResolveError::BlockExtractionFailed { .. }));
    }

    #[test]
    fn supplementary_block_stops_at_next_supplementary() {
        let pages = pages(&["[S1] G. Supp, Supp Title, 2020.\n[S2] H. More."]);
        let block = extract(&pages, 0, &ReferenceMarker::new(1, true)).unwrap();
        assert!(block.raw_text.starts_with("[S1]"));
        assert!(!block.raw_text.contains("[S2]"));
    }

    #[test]
    fn hyphenation_is_unwrapped() {
        assert_eq!(
            unwrap_lines("a non-\nunitary gauge"),
            "a nonunitary gauge"
        );
    }

    #[test]
    fn compound_hyphen_before_uppercase_is_kept() {
        assert_eq!(
            unwrap_lines("a non-\nHermitian operator"),
            "a non-Hermitian operator"
        );
    }
}
