//! Contract with the external analysis service.
//!
//! The session store depends only on this trait; the HTTP adapter in
//! `analysis-client` implements it, and tests substitute scripted
//! doubles.

use async_trait::async_trait;
use thiserror::Error;

use shared_types::{CheckId, CheckSettings, FindingId, PersonaReview, ReleaseResult, Report};

/// Result of establishing (or re-establishing) a check session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub check_id: CheckId,
    pub report: Report,
}

/// Server-approved fix for one finding: replace the first occurrence
/// of `original_text` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFix {
    pub original_text: String,
    pub replacement: String,
}

/// Categorized failure from the service boundary. `message` is shown
/// to the author verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteFailure {
    pub status_code: u16,
    pub message: String,
    pub code: Option<String>,
}

/// The external analysis collaborator. Calls are not cancellable once
/// issued and are never retried automatically; timeouts belong to the
/// transport.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze `text`, establishing a new check session.
    async fn check(
        &self,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<CheckOutcome, RemoteFailure>;

    /// Re-analyze `text` within an existing check session.
    async fn recheck(
        &self,
        check_id: &CheckId,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<Report, RemoteFailure>;

    /// Ask the service to compute a replacement for one finding.
    async fn apply_fix(
        &self,
        check_id: &CheckId,
        finding_id: &FindingId,
        text: &str,
    ) -> Result<PatchFix, RemoteFailure>;

    /// Produce the publish artifacts. The service enforces its own
    /// score threshold; the session gates locally on the same
    /// predicate so UI affordances and requests agree.
    async fn release(
        &self,
        check_id: &CheckId,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<ReleaseResult, RemoteFailure>;

    /// Review `text` through the eyes of the configured audience.
    async fn persona_review(
        &self,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<PersonaReview, RemoteFailure>;
}
