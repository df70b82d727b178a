//! Applies exactly one accepted change to document + report as an
//! all-or-nothing step: a server-approved replacement, or a local
//! deletion. The report summary is recomputed from the surviving
//! findings after every mutation.

use shared_types::{FindingId, Report, ReportSummary};

use crate::error::SessionError;

/// Replace the first occurrence of `original_text` with `replacement`
/// and remove the fixed finding from the report.
///
/// Fails with [`SessionError::AnchorNotFound`] when `original_text` is
/// absent (the document changed since the fix was computed); document
/// and report are left untouched in that case. When `original_text`
/// occurs more than once only the earliest occurrence is replaced —
/// a documented limitation of text-anchored patches.
pub fn apply_replacement(
    document: &mut String,
    report: &mut Report,
    finding_id: &FindingId,
    original_text: &str,
    replacement: &str,
) -> Result<(), SessionError> {
    let at = document
        .find(original_text)
        .ok_or(SessionError::AnchorNotFound)?;

    document.replace_range(at..at + original_text.len(), replacement);
    remove_finding(report, finding_id);
    Ok(())
}

/// Remove a finding locally, deleting its first anchor snippet from
/// the document if the snippet is still present (first occurrence).
///
/// The finding itself is removed unconditionally: a missing snippet
/// means the issue was already resolved by hand. Returns whether the
/// document text changed.
pub fn delete_finding(document: &mut String, report: &mut Report, finding_id: &FindingId) -> bool {
    let snippet = report
        .findings
        .iter()
        .find(|f| &f.id == finding_id)
        .and_then(|f| f.anchors.first())
        .map(|anchor| anchor.text.clone());

    let mut text_changed = false;
    if let Some(snippet) = snippet {
        if !snippet.is_empty() {
            if let Some(at) = document.find(&snippet) {
                document.replace_range(at..at + snippet.len(), "");
                text_changed = true;
            }
        }
    }

    remove_finding(report, finding_id);
    text_changed
}

fn remove_finding(report: &mut Report, finding_id: &FindingId) {
    report.findings.retain(|f| &f.id != finding_id);
    report.summary = ReportSummary::from_findings(&report.findings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{Anchor, Category, Finding, Severity, Verdict};

    fn finding(id: &str, snippet: &str) -> Finding {
        Finding {
            id: FindingId::new(id),
            category: Category::Security,
            severity: Severity::High,
            title: "t".to_string(),
            reason: "r".to_string(),
            suggestion: "s".to_string(),
            anchors: vec![Anchor::search(snippet)],
        }
    }

    fn report(findings: Vec<Finding>) -> Report {
        let summary = ReportSummary::from_findings(&findings);
        Report {
            verdict: Verdict::Warn,
            score: 60,
            summary,
            findings,
        }
    }

    #[test]
    fn test_replacement_touches_first_occurrence_only() {
        let mut document = "password=123 password=123".to_string();
        let mut report = report(vec![finding("f1", "password=123")]);
        let id = FindingId::new("f1");

        apply_replacement(
            &mut document,
            &mut report,
            &id,
            "password=123",
            "password=REDACTED",
        )
        .unwrap();

        assert_eq!(document, "password=REDACTED password=123");
        assert!(report.findings.is_empty());
        assert_eq!(report.summary.total_findings, 0);
    }

    #[test]
    fn test_replacement_fails_without_mutation_when_anchor_missing() {
        let mut document = "the text has moved on".to_string();
        let mut report = report(vec![finding("f1", "password=123")]);
        let id = FindingId::new("f1");

        let err = apply_replacement(&mut document, &mut report, &id, "password=123", "x")
            .unwrap_err();

        assert!(matches!(err, SessionError::AnchorNotFound));
        assert_eq!(document, "the text has moved on");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.summary.total_findings, 1);
    }

    #[test]
    fn test_replacement_recomputes_summary_buckets() {
        let mut document = "alpha beta".to_string();
        let mut report = report(vec![finding("f1", "alpha"), finding("f2", "beta")]);

        apply_replacement(
            &mut document,
            &mut report,
            &FindingId::new("f1"),
            "alpha",
            "gamma",
        )
        .unwrap();

        assert_eq!(report.summary.total_findings, 1);
        assert_eq!(report.summary.by_severity.total(), 1);
        assert!(report.summary_is_consistent());
    }

    #[test]
    fn test_delete_removes_snippet_and_finding() {
        let mut document = "keep secret=abc keep".to_string();
        let mut report = report(vec![finding("f1", "secret=abc ")]);

        let changed = delete_finding(&mut document, &mut report, &FindingId::new("f1"));

        assert!(changed);
        assert_eq!(document, "keep keep");
        assert!(report.findings.is_empty());
        assert_eq!(report.summary.total_findings, 0);
    }

    #[test]
    fn test_delete_proceeds_when_snippet_already_gone() {
        let mut document = "already cleaned up".to_string();
        let mut report = report(vec![finding("f1", "secret=abc")]);

        let changed = delete_finding(&mut document, &mut report, &FindingId::new("f1"));

        assert!(!changed);
        assert_eq!(document, "already cleaned up");
        assert!(report.findings.is_empty());
        assert_eq!(report.summary.total_findings, 0);
    }

    #[test]
    fn test_delete_removes_first_occurrence_only() {
        let mut document = "dup dup".to_string();
        let mut report = report(vec![finding("f1", "dup")]);

        delete_finding(&mut document, &mut report, &FindingId::new("f1"));

        assert_eq!(document, " dup");
    }

    #[test]
    fn test_delete_of_unknown_finding_keeps_others_intact() {
        let mut document = "alpha beta".to_string();
        let mut report = report(vec![finding("f1", "alpha")]);

        let changed = delete_finding(&mut document, &mut report, &FindingId::new("missing"));

        assert!(!changed);
        assert_eq!(report.findings.len(), 1);
        assert!(report.summary_is_consistent());
    }

    #[test]
    fn test_summary_invariant_holds_across_mutation_sequence() {
        let mut document = "one two three four".to_string();
        let mut report = report(vec![
            finding("f1", "one"),
            finding("f2", "two"),
            finding("f3", "three"),
            finding("f4", "four"),
        ]);

        apply_replacement(&mut document, &mut report, &FindingId::new("f1"), "one", "1").unwrap();
        assert!(report.summary_is_consistent());

        delete_finding(&mut document, &mut report, &FindingId::new("f3"));
        assert!(report.summary_is_consistent());

        delete_finding(&mut document, &mut report, &FindingId::new("f2"));
        assert!(report.summary_is_consistent());

        assert_eq!(report.summary.total_findings, 1);
        assert_eq!(report.findings[0].id.as_str(), "f4");
    }
}
