use serde::{Deserialize, Serialize};

/// Publish artifacts handed back by the release endpoint: a sanitized
/// copy of the document plus what was changed and what to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub safe_markdown: String,
    #[serde(default)]
    pub fix_summary: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
}
