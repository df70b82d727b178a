//! Maps finding anchors onto concrete byte ranges of the current
//! document, and answers point queries over the resulting ranges.
//!
//! Anchors describe semantic targets (a phrase flagged as risky), not
//! stable offsets: the document is edited between the time a finding is
//! issued and the time it is displayed. Ranges are therefore recomputed
//! from the live text on every call instead of being stored. Everything
//! here is pure and deterministic, so the render path can call it per
//! frame and click-to-select stays consistent with what was drawn.

use serde::{Deserialize, Serialize};
use shared_types::{Finding, FindingId};

/// A concrete half-open `[start, end)` byte interval owned by a finding,
/// derived from one anchor against one document snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRange {
    pub finding_id: FindingId,
    pub start: usize,
    pub end: usize,
}

/// Derive highlight ranges for every finding anchor against `document`.
///
/// Offset-mode anchors are clamped into `[0, document.len()]`; a range
/// that is degenerate after clamping is dropped, not an error. Search-
/// mode anchors emit one range per occurrence of the snippet, including
/// overlapping occurrences; an empty snippet yields nothing.
///
/// The result is sorted by `start` ascending, with the findings'
/// declaration order breaking ties.
pub fn align(document: &str, findings: &[Finding]) -> Vec<HighlightRange> {
    let mut ranges = Vec::new();

    for finding in findings {
        for anchor in &finding.anchors {
            match (anchor.start, anchor.end) {
                (Some(start), Some(end)) => {
                    let len = document.len() as i64;
                    let start = start.clamp(0, len) as usize;
                    let end = end.clamp(0, len) as usize;
                    if start < end {
                        ranges.push(HighlightRange {
                            finding_id: finding.id.clone(),
                            start,
                            end,
                        });
                    }
                }
                _ => {
                    if anchor.text.is_empty() {
                        continue;
                    }
                    let mut cursor = 0;
                    while let Some(offset) = document[cursor..].find(&anchor.text) {
                        let start = cursor + offset;
                        ranges.push(HighlightRange {
                            finding_id: finding.id.clone(),
                            start,
                            end: start + anchor.text.len(),
                        });
                        // Step one char, not one match length, so
                        // overlapping occurrences are also surfaced.
                        match document[start..].chars().next() {
                            Some(c) => cursor = start + c.len_utf8(),
                            None => break,
                        }
                    }
                }
            }
        }
    }

    // Stable sort: equal starts keep report declaration order.
    ranges.sort_by_key(|r| r.start);
    ranges
}

/// Which finding, if any, covers byte position `position`.
///
/// Endpoint-inclusive on both sides: a caret landing exactly on a range
/// boundary still hits the range. When ranges overlap, the first range
/// in iteration order wins; that is a defined tie-break.
pub fn hit_test(ranges: &[HighlightRange], position: usize) -> Option<&FindingId> {
    ranges
        .iter()
        .find(|r| r.start <= position && position <= r.end)
        .map(|r| &r.finding_id)
}
