//! Overlap resolution.
//!
//! Reduces overlapping detections to one survivor per overlap, chosen by
//! category specificity, then confidence, then span length, then the fixed
//! category priority order.

use crate::models::Detection;
use std::cmp::Ordering;

/// Resolves overlapping detections.
///
/// Candidates are visited best-first and kept when they do not overlap any
/// span already kept. The result is sorted ascending by start offset and is
/// pairwise non-overlapping.
#[must_use]
pub fn resolve(mut detections: Vec<Detection>) -> Vec<Detection> {
    let candidates = detections.len();
    detections.sort_by(precedence);

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        if kept.iter().all(|k| !k.overlaps(&detection)) {
            kept.push(detection);
        }
    }

    kept.sort_by_key(|d| (d.start(), d.end()));

    tracing::debug!(
        candidates,
        resolved = kept.len(),
        "Resolved overlapping detections"
    );

    kept
}

/// Orders `a` before `b` when `a` should win an overlap.
fn precedence(a: &Detection, b: &Detection) -> Ordering {
    b.category()
        .specificity()
        .cmp(&a.category().specificity())
        .then_with(|| b.confidence().total_cmp(&a.confidence()))
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.category().priority().cmp(&b.category().priority()))
        .then_with(|| a.start().cmp(&b.start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DetectionSource};

    fn detection(start: usize, end: usize, category: Category, confidence: f64) -> Detection {
        Detection::new(
            start,
            end,
            category,
            "x".repeat(end - start),
            confidence,
            DetectionSource::Builtin { pattern: "test" },
        )
        .unwrap()
    }

    #[test]
    fn test_specific_category_beats_generic() {
        let resolved = resolve(vec![
            detection(5, 16, Category::Id, 0.65),
            detection(5, 16, Category::Ssn, 0.85),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category(), Category::Ssn);
    }

    #[test]
    fn test_specificity_outranks_confidence() {
        let resolved = resolve(vec![
            detection(0, 10, Category::Id, 0.99),
            detection(2, 8, Category::Phone, 0.6),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category(), Category::Phone);
    }

    #[test]
    fn test_same_tier_higher_confidence_wins() {
        let resolved = resolve(vec![
            detection(0, 10, Category::Phone, 0.7),
            detection(3, 12, Category::Financial, 0.9),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category(), Category::Financial);
    }

    #[test]
    fn test_equal_confidence_longer_span_wins() {
        let resolved = resolve(vec![
            detection(0, 6, Category::Phone, 0.85),
            detection(0, 12, Category::Phone, 0.85),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].end(), 12);
    }

    #[test]
    fn test_full_tie_uses_priority_order() {
        let resolved = resolve(vec![
            detection(0, 10, Category::Medical, 0.85),
            detection(0, 10, Category::Phone, 0.85),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category(), Category::Phone);
    }

    #[test]
    fn test_disjoint_spans_all_kept_in_order() {
        let resolved = resolve(vec![
            detection(20, 25, Category::Email, 0.85),
            detection(0, 5, Category::Phone, 0.85),
            detection(5, 10, Category::Id, 0.65),
        ]);

        let starts: Vec<usize> = resolved.iter().map(Detection::start).collect();
        assert_eq!(starts, vec![0, 5, 20]);
    }

    #[test]
    fn test_chain_of_overlaps() {
        // B overlaps both A and C; B wins, A and C are dropped.
        let resolved = resolve(vec![
            detection(0, 6, Category::Id, 0.65),
            detection(4, 12, Category::Email, 0.85),
            detection(10, 16, Category::Id, 0.65),
        ]);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category(), Category::Email);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve(Vec::new()).is_empty());
    }
}
