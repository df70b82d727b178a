//! Check settings and the severity filter applied to finding lists.

use serde::{Deserialize, Serialize};

use crate::report::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishScope {
    Public,
    Unlisted,
    Private,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Technical,
    Casual,
    Formal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Engineers,
    General,
    Internal,
    Executives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactMode {
    None,
    Light,
    Strict,
}

/// Settings sent with every analysis request. The persona review is
/// keyed by `audience`; changing it invalidates a cached review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSettings {
    pub publish_scope: PublishScope,
    pub tone: Tone,
    pub audience: Audience,
    pub redact_mode: RedactMode,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            publish_scope: PublishScope::Public,
            tone: Tone::Technical,
            audience: Audience::Engineers,
            redact_mode: RedactMode::Light,
        }
    }
}

/// Severity buckets the finding list can be narrowed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeverityFilter {
    #[default]
    All,
    HighAndCritical,
    LowAndMedium,
}

impl SeverityFilter {
    pub fn matches(&self, severity: Severity) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::HighAndCritical => {
                matches!(severity, Severity::High | Severity::Critical)
            }
            SeverityFilter::LowAndMedium => {
                matches!(severity, Severity::Low | Severity::Medium)
            }
        }
    }
}
