//! Persona review: a report-shaped result keyed by audience rather
//! than by anchored categories.

use serde::{Deserialize, Serialize};

use crate::report::{Anchor, FindingId, Severity, SeverityCounts, Verdict};
use crate::settings::Audience;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaItem {
    pub id: FindingId,
    pub severity: Severity,
    pub title: String,
    pub reason: String,
    pub suggestion: String,
    #[serde(rename = "highlights", default)]
    pub anchors: Vec<Anchor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSummary {
    pub total: u32,
    pub by_severity: SeverityCounts,
}

/// Review of the document through the eyes of the configured audience.
/// Stale as soon as the audience setting changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaReview {
    pub audience: Audience,
    pub verdict: Verdict,
    pub summary: PersonaSummary,
    pub items: Vec<PersonaItem>,
}
