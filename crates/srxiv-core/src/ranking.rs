//! Fuzzy-similarity ranking of search candidates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::SearchResult;

/// Candidates scoring below this are discarded. Chosen empirically: low
/// enough to tolerate OCR and typography noise in the extracted title,
/// high enough to reject unrelated hits.
pub const SCORE_THRESHOLD: f64 = 50.0;

/// Normalize a title for comparison: lowercase alphanumeric only.
fn normalize_title(title: &str) -> String {
    static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
    let lowered = title.to_lowercase();
    NON_ALNUM.replace_all(&lowered, "").to_string()
}

/// Similarity between two titles in [0, 100].
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let norm_a = normalize_title(a);
    let norm_b = normalize_title(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return 0.0;
    }
    rapidfuzz::fuzz::ratio(norm_a.chars(), norm_b.chars()) * 100.0
}

/// Score, filter and sort candidates by similarity to the parsed title.
///
/// Without a target title ranking is meaningless (authors-only citations),
/// so candidates pass through unscored in their original API order. With a
/// target, candidates below [`SCORE_THRESHOLD`] are dropped and the rest
/// are sorted descending; the sort is stable, so ties keep the API order.
pub fn rank(candidates: Vec<SearchResult>, target_title: Option<&str>) -> Vec<SearchResult> {
    let Some(target) = target_title else {
        return candidates;
    };

    let mut scored: Vec<SearchResult> = candidates
        .into_iter()
        .map(|mut candidate| {
            candidate.score = Some(title_similarity(target, &candidate.title));
            candidate
        })
        .filter(|c| c.score.is_some_and(|s| s >= SCORE_THRESHOLD))
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, title: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: title.to_string(),
            authors: vec![],
            summary: String::new(),
            score: None,
        }
    }

    #[test]
    fn no_target_passes_through_unscored() {
        let candidates = vec![result("a", "First"), result("b", "Second")];
        let ranked = rank(candidates.clone(), None);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "a");
        assert_eq!(ranked[1].id, "b");
        assert!(ranked.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn low_scores_are_discarded() {
        let candidates = vec![
            result("hit", "Finite Temperature Behavior of Lattice Models"),
            result("miss", "Marine Biology"),
        ];
        let ranked = rank(candidates, Some("Finite temperature behavior of lattice models"));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "hit");
        assert!(ranked[0].score.unwrap() >= SCORE_THRESHOLD);
    }

    #[test]
    fn order_is_non_increasing_in_score() {
        let candidates = vec![
            result("close", "On gauging finite subgroup"),
            result("exact", "On gauging finite subgroups"),
        ];
        let ranked = rank(candidates, Some("On gauging finite subgroups"));
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "exact");
        assert!(ranked[0].score.unwrap() >= ranked[1].score.unwrap());
    }

    #[test]
    fn ties_keep_api_order() {
        let candidates = vec![
            result("first", "Identical Title"),
            result("second", "Identical Title"),
        ];
        let ranked = rank(candidates, Some("Identical Title"));
        assert_eq!(ranked[0].id, "first");
        assert_eq!(ranked[1].id, "second");
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let score = title_similarity(
            "Generalized Tube Algebras, Symmetry-Resolved Partition Functions",
            "generalized tube algebras symmetry resolved partition functions",
        );
        assert!((score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_titles_score_zero() {
        assert_eq!(title_similarity("", "Something"), 0.0);
        assert_eq!(title_similarity("...", "Something"), 0.0);
    }
}
