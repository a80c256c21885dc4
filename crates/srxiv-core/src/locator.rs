//! Backward page search for a reference marker.

use crate::{ReferenceMarker, ResolveError};

/// Find the page containing the requested reference marker.
///
/// Scans pages from the last to the first, counting pages on which the
/// literal marker token appears, and returns the index of the page holding
/// the `depth`-th backward match. Reference lists live at the end of a
/// document, so the backward scan finds the list entry rather than an
/// in-text citation of the same number on an earlier page.
pub fn locate(pages: &[String], marker: &ReferenceMarker) -> Result<usize, ResolveError> {
    let token = marker.token();
    let mut found = 0u32;

    for idx in (0..pages.len()).rev() {
        if pages[idx].contains(&token) {
            found += 1;
            if found >= marker.depth {
                tracing::debug!(page = idx, token = %token, depth = marker.depth, "located marker");
                return Ok(idx);
            }
        }
    }

    Err(ResolveError::ReferenceNotFound {
        marker: token,
        depth: marker.depth,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_marker_on_last_page() {
        let pages = pages(&["intro text", "body [3] cited", "[3] A. Author, Title, 2020."]);
        let marker = ReferenceMarker::new(3, false);
        assert_eq!(locate(&pages, &marker).unwrap(), 2);
    }

    #[test]
    fn depth_selects_earlier_occurrence() {
        // [2] appears in both the supplementary and main reference lists
        let pages = pages(&["[2] main ref", "appendix", "[2] supp ref"]);
        let marker = ReferenceMarker::new(2, false).with_depth(2);
        assert_eq!(locate(&pages, &marker).unwrap(), 0);
    }

    #[test]
    fn supplementary_marker_is_distinct() {
        let pages = pages(&["[4] main ref", "[S4] supp ref"]);
        let marker = ReferenceMarker::new(4, true);
        assert_eq!(locate(&pages, &marker).unwrap(), 1);
    }

    #[test]
    fn missing_marker_reports_not_found() {
        let pages = pages(&["no refs here", "still none"]);
        let err = locate(&pages, &ReferenceMarker::new(7, false)).unwrap_err();
        match err {
            ResolveError::ReferenceNotFound { marker, found, .. } => {
                assert_eq!(marker, "[7]");
                assert_eq!(found, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn excessive_depth_reports_match_count() {
        let pages = pages(&["[1] only once"]);
        let marker = ReferenceMarker::new(1, false).with_depth(3);
        let err = locate(&pages, &marker).unwrap_err();
        match err {
            ResolveError::ReferenceNotFound { depth, found, .. } => {
                assert_eq!(depth, 3);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn backward_rank_equals_depth() {
        // Marker present on pages 0, 2 and 4; backward ranks are 4→1, 2→2, 0→3
        let pages = pages(&["[9] a", "x", "[9] b", "y", "[9] c"]);
        for (depth, expect) in [(1, 4usize), (2, 2), (3, 0)] {
            let marker = ReferenceMarker::new(9, false).with_depth(depth);
            assert_eq!(locate(&pages, &marker).unwrap(), expect);
        }
    }
}
