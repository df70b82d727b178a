use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse pass/warn/fail judgment attached to a report or persona review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ok,
    Warn,
    Bad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Privacy,
    Legal,
    Compliance,
    Tone,
    Quality,
}

/// Identifier of a finding, unique within a report. Minted by the
/// analysis service; opaque to this client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingId(pub String);

impl FindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token correlating client-side edits with a server-side analysis
/// session. Required for recheck, patch generation and release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(pub String);

impl CheckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where in the document a finding applies.
///
/// Anchors are issued against the text as it was at check time; the
/// document may have been edited since. With explicit `start`/`end`
/// the anchor pins an offset range (clamped at alignment time), and
/// without them the snippet is located by substring search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl Anchor {
    /// Search-mode anchor: locate the snippet wherever it occurs.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
            start: None,
            end: None,
        }
    }

    /// Offset-mode anchor: explicit half-open range.
    pub fn at(text: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            text: text.into(),
            context: None,
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn has_offsets(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// A single risk annotation produced by the analysis service.
/// Immutable once issued; the only in-place report mutation is removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: FindingId,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub reason: String,
    pub suggestion: String,
    #[serde(rename = "highlights", default)]
    pub anchors: Vec<Anchor>,
}

/// Finding counts per severity bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl SeverityCounts {
    pub fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high + self.critical
    }
}

/// Derived aggregate over a report's findings.
///
/// Invariant: `total_findings == findings.len()` and both bucket maps
/// sum to the total. Recomputed via [`ReportSummary::from_findings`]
/// after every local mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_findings: u32,
    pub by_severity: SeverityCounts,
    #[serde(default)]
    pub by_category: BTreeMap<Category, u32>,
}

impl ReportSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut by_severity = SeverityCounts::default();
        let mut by_category = BTreeMap::new();
        for finding in findings {
            by_severity.bump(finding.severity);
            *by_category.entry(finding.category).or_insert(0) += 1;
        }
        Self {
            total_findings: findings.len() as u32,
            by_severity,
            by_category,
        }
    }

    pub fn empty() -> Self {
        Self::from_findings(&[])
    }
}

/// Analysis result for one check of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub verdict: Verdict,
    pub score: u8,
    pub summary: ReportSummary,
    pub findings: Vec<Finding>,
}

impl Report {
    /// Whether the summary agrees with the finding list.
    pub fn summary_is_consistent(&self) -> bool {
        let expected = ReportSummary::from_findings(&self.findings);
        self.summary.total_findings == expected.total_findings
            && self.summary.by_severity == expected.by_severity
            && self.summary.by_category == expected.by_category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn finding(id: &str, category: Category, severity: Severity) -> Finding {
        Finding {
            id: FindingId::new(id),
            category,
            severity,
            title: "t".to_string(),
            reason: "r".to_string(),
            suggestion: "s".to_string(),
            anchors: vec![Anchor::search("snippet")],
        }
    }

    #[test]
    fn test_summary_counts_by_severity_and_category() {
        let findings = vec![
            finding("f1", Category::Security, Severity::High),
            finding("f2", Category::Privacy, Severity::Medium),
            finding("f3", Category::Security, Severity::Critical),
        ];
        let summary = ReportSummary::from_findings(&findings);

        assert_eq!(summary.total_findings, 3);
        assert_eq!(summary.by_severity.high, 1);
        assert_eq!(summary.by_severity.medium, 1);
        assert_eq!(summary.by_severity.critical, 1);
        assert_eq!(summary.by_severity.total(), 3);
        assert_eq!(summary.by_category[&Category::Security], 2);
        assert_eq!(summary.by_category[&Category::Privacy], 1);
    }

    #[test]
    fn test_summary_of_no_findings_is_empty() {
        let summary = ReportSummary::empty();
        assert_eq!(summary.total_findings, 0);
        assert_eq!(summary.by_severity.total(), 0);
        assert!(summary.by_category.is_empty());
    }

    #[test]
    fn test_report_deserializes_service_json() {
        // Shape produced by the analysis service.
        let json = r#"{
            "verdict": "warn",
            "score": 72,
            "summary": {
                "totalFindings": 1,
                "bySeverity": {"low": 0, "medium": 0, "high": 1, "critical": 0},
                "byCategory": {"security": 1}
            },
            "findings": [{
                "id": "f-001",
                "category": "security",
                "severity": "high",
                "title": "API key in code block",
                "reason": "A credential is embedded in the text.",
                "suggestion": "Replace it with a placeholder.",
                "highlights": [{"text": "sk-test-12345", "context": "code block"}]
            }]
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.verdict, Verdict::Warn);
        assert_eq!(report.score, 72);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].id.as_str(), "f-001");
        assert_eq!(report.findings[0].anchors[0].text, "sk-test-12345");
        assert!(!report.findings[0].anchors[0].has_offsets());
        assert!(report.summary_is_consistent());
    }

    #[test]
    fn test_finding_serializes_anchors_as_highlights() {
        let value = serde_json::to_value(finding("f1", Category::Tone, Severity::Low)).unwrap();
        assert!(value.get("highlights").is_some());
        assert!(value.get("anchors").is_none());
        assert_eq!(value["severity"], "low");
        assert_eq!(value["category"], "tone");
    }

    #[test]
    fn test_offset_anchor_roundtrip() {
        let anchor = Anchor::at("foo", 4, 7);
        let json = serde_json::to_string(&anchor).unwrap();
        let back: Anchor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, anchor);
        assert!(back.has_offsets());
    }
}
