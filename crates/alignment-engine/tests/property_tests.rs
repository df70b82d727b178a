//! Property-based tests for the alignment engine.
//!
//! Checks the alignment invariants over arbitrary documents and
//! anchors using proptest.

use alignment_engine::{align, hit_test};
use proptest::prelude::*;
use shared_types::{Anchor, Category, Finding, FindingId, Severity};

fn finding_with(anchors: Vec<Anchor>) -> Finding {
    Finding {
        id: FindingId::new("f-prop"),
        category: Category::Quality,
        severity: Severity::Low,
        title: "t".to_string(),
        reason: "r".to_string(),
        suggestion: "s".to_string(),
        anchors,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // ============================================================
    // Determinism
    // ============================================================

    #[test]
    fn align_is_deterministic(
        doc in ".{0,200}",
        snippet in ".{0,8}",
        start in -100i64..300,
        end in -100i64..300,
    ) {
        let findings = vec![
            finding_with(vec![Anchor::search(snippet.clone())]),
            finding_with(vec![Anchor::at(snippet, start, end)]),
        ];
        prop_assert_eq!(align(&doc, &findings), align(&doc, &findings));
    }

    // ============================================================
    // Range invariants
    // ============================================================

    #[test]
    fn ranges_stay_inside_document(
        doc in ".{0,200}",
        snippet in ".{1,8}",
        start in -100i64..300,
        end in -100i64..300,
    ) {
        let findings = vec![
            finding_with(vec![Anchor::search(snippet.clone())]),
            finding_with(vec![Anchor::at(snippet, start, end)]),
        ];
        for range in align(&doc, &findings) {
            prop_assert!(range.start < range.end);
            prop_assert!(range.end <= doc.len());
        }
    }

    #[test]
    fn ranges_are_sorted_by_start(
        doc in "[ab ]{0,60}",
        a in "[ab]{1,3}",
        b in "[ab]{1,3}",
    ) {
        let findings = vec![
            finding_with(vec![Anchor::search(a)]),
            finding_with(vec![Anchor::search(b)]),
        ];
        let ranges = align(&doc, &findings);
        for pair in ranges.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn search_ranges_slice_back_to_snippet(
        doc in "[abc ]{0,60}",
        snippet in "[abc]{1,4}",
    ) {
        let findings = vec![finding_with(vec![Anchor::search(snippet.clone())])];
        for range in align(&doc, &findings) {
            prop_assert_eq!(&doc[range.start..range.end], snippet.as_str());
        }
    }

    // ============================================================
    // Hit testing
    // ============================================================

    #[test]
    fn hit_test_hits_exactly_inside_covered_intervals(
        doc in "[xy ]{1,60}",
        snippet in "[xy]{1,3}",
        position in 0usize..80,
    ) {
        let findings = vec![finding_with(vec![Anchor::search(snippet)])];
        let ranges = align(&doc, &findings);
        let covered = ranges
            .iter()
            .any(|r| r.start <= position && position <= r.end);
        prop_assert_eq!(hit_test(&ranges, position).is_some(), covered);
    }
}
