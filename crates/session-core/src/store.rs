//! The document session aggregate: single owner of the text, the
//! current report, the persona review and the per-operation statuses.
//!
//! All mutation goes through this type. Asynchronous operations are
//! split into a synchronous `begin_*` phase (snapshot inputs, bump the
//! status slot) and a synchronous `complete_*` phase (fence-checked
//! write-back), with `run_*` conveniences that drive both around one
//! service call. An embedding event loop may interleave other session
//! mutations between the two phases; a completion whose fence token
//! has been superseded is dropped.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use alignment_engine::{align, hit_test, HighlightRange};
use shared_types::{
    Audience, CheckId, CheckSettings, Finding, FindingId, PersonaReview, PublishScope, RedactMode,
    ReleaseResult, Report, SeverityFilter, Tone, Verdict,
};

use crate::error::SessionError;
use crate::mutation;
use crate::service::{AnalysisService, CheckOutcome, PatchFix, RemoteFailure};
use crate::status::{Generation, OpSlot, OpStatus};

/// Text a fresh session starts with.
pub const SAMPLE_DOCUMENT: &str = "\
# Sample blog post

This is sample text for the risk checker.

## Before you publish

- Keep API keys and passwords out of code blocks
- Watch for personal data such as email addresses and phone numbers
- Double-check internal project names and unreleased dates

Run a check to see findings anchored to the text above.
";

/// Partial update to the check settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub publish_scope: Option<PublishScope>,
    pub tone: Option<Tone>,
    pub audience: Option<Audience>,
    pub redact_mode: Option<RedactMode>,
}

impl SettingsPatch {
    pub fn audience(audience: Audience) -> Self {
        Self {
            audience: Some(audience),
            ..Self::default()
        }
    }

    pub fn publish_scope(scope: PublishScope) -> Self {
        Self {
            publish_scope: Some(scope),
            ..Self::default()
        }
    }
}

/// Snapshot handed out by [`DocumentSession::begin_check`] /
/// [`DocumentSession::begin_recheck`]. `check_id` is `Some` when the
/// request should go through the recheck path.
#[derive(Debug, Clone)]
pub struct PendingCheck {
    pub token: Generation,
    pub text: String,
    pub settings: CheckSettings,
    pub check_id: Option<CheckId>,
}

#[derive(Debug, Clone)]
pub struct PendingPersona {
    pub token: Generation,
    pub text: String,
    pub settings: CheckSettings,
}

#[derive(Debug, Clone)]
pub struct PendingRelease {
    pub token: Generation,
    pub check_id: CheckId,
    pub text: String,
    pub settings: CheckSettings,
}

pub struct DocumentSession<S> {
    service: S,

    project_name: String,
    doc_title: String,

    text: String,
    saved: bool,
    settings: CheckSettings,

    check_id: Option<CheckId>,
    report: Option<Report>,
    persona: Option<PersonaReview>,
    release: Option<ReleaseResult>,

    check_slot: OpSlot,
    persona_slot: OpSlot,
    release_slot: OpSlot,
    error_message: Option<String>,

    selected_finding: Option<FindingId>,
    collapsed_findings: BTreeSet<FindingId>,
    severity_filter: SeverityFilter,

    last_checked_at: Option<DateTime<Utc>>,
}

impl<S> DocumentSession<S> {
    pub fn new(service: S) -> Self {
        Self::with_text(service, SAMPLE_DOCUMENT)
    }

    pub fn with_text(service: S, text: impl Into<String>) -> Self {
        Self {
            service,
            project_name: "My Project".to_string(),
            doc_title: "Untitled".to_string(),
            text: text.into(),
            saved: true,
            settings: CheckSettings::default(),
            check_id: None,
            report: None,
            persona: None,
            release: None,
            check_slot: OpSlot::new(),
            persona_slot: OpSlot::new(),
            release_slot: OpSlot::new(),
            error_message: None,
            selected_finding: None,
            collapsed_findings: BTreeSet::new(),
            severity_filter: SeverityFilter::default(),
            last_checked_at: None,
        }
    }

    // ============================================================
    // Reads
    // ============================================================

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// False once the text has been edited since the last successful
    /// check or recheck.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn doc_title(&self) -> &str {
        &self.doc_title
    }

    pub fn settings(&self) -> &CheckSettings {
        &self.settings
    }

    pub fn check_id(&self) -> Option<&CheckId> {
        self.check_id.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn persona(&self) -> Option<&PersonaReview> {
        self.persona.as_ref()
    }

    pub fn release_result(&self) -> Option<&ReleaseResult> {
        self.release.as_ref()
    }

    pub fn check_status(&self) -> OpStatus {
        self.check_slot.status()
    }

    pub fn persona_status(&self) -> OpStatus {
        self.persona_slot.status()
    }

    pub fn release_status(&self) -> OpStatus {
        self.release_slot.status()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn selected_finding(&self) -> Option<&FindingId> {
        self.selected_finding.as_ref()
    }

    pub fn is_selected(&self, finding_id: &FindingId) -> bool {
        self.selected_finding.as_ref() == Some(finding_id)
    }

    pub fn is_collapsed(&self, finding_id: &FindingId) -> bool {
        self.collapsed_findings.contains(finding_id)
    }

    pub fn severity_filter(&self) -> SeverityFilter {
        self.severity_filter
    }

    pub fn last_checked_at(&self) -> Option<DateTime<Utc>> {
        self.last_checked_at
    }

    // ============================================================
    // Derived views
    // ============================================================

    /// Highlight ranges for the current report against the current
    /// text. Recomputed per call; safe on a render path.
    pub fn highlights(&self) -> Vec<HighlightRange> {
        match &self.report {
            Some(report) => align(&self.text, &report.findings),
            None => Vec::new(),
        }
    }

    /// Which finding covers byte position `position`, if any.
    pub fn finding_at(&self, position: usize) -> Option<FindingId> {
        let ranges = self.highlights();
        hit_test(&ranges, position).cloned()
    }

    /// Findings passing the current severity filter, in report order.
    pub fn filtered_findings(&self) -> Vec<&Finding> {
        let filter = self.severity_filter;
        match &self.report {
            Some(report) => report
                .findings
                .iter()
                .filter(|f| filter.matches(f.severity))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Local half of the release gate; matches the predicate the
    /// service enforces so affordances and requests agree.
    pub fn release_ready(&self) -> bool {
        self.check_id.is_some()
            && matches!(self.report.as_ref().map(|r| r.verdict), Some(Verdict::Ok))
    }

    // ============================================================
    // Local edits
    // ============================================================

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.saved = false;
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    pub fn set_doc_title(&mut self, title: impl Into<String>) {
        self.doc_title = title.into();
    }

    pub fn select_finding(&mut self, finding_id: Option<FindingId>) {
        self.selected_finding = finding_id;
    }

    pub fn set_severity_filter(&mut self, filter: SeverityFilter) {
        self.severity_filter = filter;
    }

    /// Collapse state is replaced wholesale so observers can diff the
    /// set by identity.
    pub fn toggle_collapsed(&mut self, finding_id: &FindingId) {
        let mut next = self.collapsed_findings.clone();
        if !next.remove(finding_id) {
            next.insert(finding_id.clone());
        }
        self.collapsed_findings = next;
    }

    /// Apply a partial settings update. Changing the audience makes a
    /// cached persona review stale: a mismatched result is cleared and
    /// the persona slot resets to idle, superseding any review still
    /// in flight.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let old_audience = self.settings.audience;

        if let Some(scope) = patch.publish_scope {
            self.settings.publish_scope = scope;
        }
        if let Some(tone) = patch.tone {
            self.settings.tone = tone;
        }
        if let Some(audience) = patch.audience {
            self.settings.audience = audience;
        }
        if let Some(mode) = patch.redact_mode {
            self.settings.redact_mode = mode;
        }

        if let Some(audience) = patch.audience {
            if audience != old_audience {
                if self.persona.as_ref().map(|p| p.audience) != Some(audience) {
                    self.persona = None;
                }
                self.persona_slot.reset();
                debug!(?audience, "audience changed, persona review is stale");
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn clear_release(&mut self) {
        self.release = None;
        self.release_slot.reset();
    }

    fn fail(&mut self, err: SessionError) {
        if err.is_local() {
            warn!("{err}");
        } else {
            error!("{err}");
        }
        self.error_message = Some(err.to_string());
    }

    // ============================================================
    // Check / recheck
    // ============================================================

    /// Start a fresh check, establishing a new check identity.
    pub fn begin_check(&mut self) -> PendingCheck {
        self.error_message = None;
        let token = self.check_slot.begin();
        info!(token, "check started");
        PendingCheck {
            token,
            text: self.text.clone(),
            settings: self.settings,
            check_id: None,
        }
    }

    /// Start a recheck of the existing session. Without an established
    /// check identity this routes through the check path instead.
    pub fn begin_recheck(&mut self) -> PendingCheck {
        let mut pending = self.begin_check();
        pending.check_id = self.check_id.clone();
        pending
    }

    /// Write back a check or recheck outcome. Dropped when `token` has
    /// been superseded by a newer invocation.
    pub fn complete_check(&mut self, token: Generation, outcome: Result<CheckOutcome, RemoteFailure>) {
        match outcome {
            Ok(result) => {
                if !self.check_slot.finish(token, OpStatus::Success) {
                    debug!(token, "dropping superseded check result");
                    return;
                }
                info!(check_id = %result.check_id, verdict = ?result.report.verdict, "check complete");
                self.check_id = Some(result.check_id);
                self.report = Some(result.report);
                self.saved = true;
                self.last_checked_at = Some(Utc::now());
            }
            Err(failure) => {
                if !self.check_slot.finish(token, OpStatus::Error) {
                    debug!(token, "dropping superseded check failure");
                    return;
                }
                error!(status = failure.status_code, "check failed: {}", failure.message);
                self.error_message = Some(failure.message);
            }
        }
    }
}

impl<S: AnalysisService> DocumentSession<S> {
    pub async fn run_check(&mut self) {
        let pending = self.begin_check();
        let outcome = self.service.check(&pending.text, &pending.settings).await;
        self.complete_check(pending.token, outcome);
    }

    pub async fn run_recheck(&mut self) {
        let pending = self.begin_recheck();
        let outcome = match &pending.check_id {
            Some(check_id) => self
                .service
                .recheck(check_id, &pending.text, &pending.settings)
                .await
                .map(|report| CheckOutcome {
                    check_id: check_id.clone(),
                    report,
                }),
            None => self.service.check(&pending.text, &pending.settings).await,
        };
        self.complete_check(pending.token, outcome);
    }

    // ============================================================
    // Fix application / local deletion
    // ============================================================

    /// Ask the service for a fix to `finding_id` and apply it to the
    /// document. Requires an established check session and a report.
    pub async fn apply_fix(&mut self, finding_id: &FindingId) {
        self.error_message = None;
        let Some(check_id) = self.check_id.clone() else {
            self.fail(SessionError::NoCheckSession);
            return;
        };
        if self.report.is_none() {
            self.fail(SessionError::NoReport);
            return;
        }

        info!(%finding_id, "requesting fix");
        match self.service.apply_fix(&check_id, finding_id, &self.text).await {
            Ok(fix) => self.apply_fix_locally(finding_id, &fix),
            Err(failure) => self.fail(SessionError::Remote(failure)),
        }
    }

    // ============================================================
    // Persona review
    // ============================================================

    pub fn begin_persona_review(&mut self) -> PendingPersona {
        self.error_message = None;
        let token = self.persona_slot.begin();
        info!(token, audience = ?self.settings.audience, "persona review started");
        PendingPersona {
            token,
            text: self.text.clone(),
            settings: self.settings,
        }
    }

    pub fn complete_persona_review(
        &mut self,
        token: Generation,
        outcome: Result<PersonaReview, RemoteFailure>,
    ) {
        match outcome {
            Ok(review) => {
                if !self.persona_slot.finish(token, OpStatus::Success) {
                    debug!(token, "dropping superseded persona review");
                    return;
                }
                info!(audience = ?review.audience, verdict = ?review.verdict, "persona review complete");
                self.persona = Some(review);
            }
            Err(failure) => {
                if !self.persona_slot.finish(token, OpStatus::Error) {
                    debug!(token, "dropping superseded persona failure");
                    return;
                }
                error!(status = failure.status_code, "persona review failed: {}", failure.message);
                self.error_message = Some(failure.message);
            }
        }
    }

    pub async fn run_persona_review(&mut self) {
        let pending = self.begin_persona_review();
        let outcome = self
            .service
            .persona_review(&pending.text, &pending.settings)
            .await;
        self.complete_persona_review(pending.token, outcome);
    }

    /// Called when the persona surface becomes active: runs a review
    /// if the slot is idle (fresh session, or reset by an audience
    /// change).
    pub async fn ensure_persona_fresh(&mut self) {
        if self.persona_slot.is_idle() {
            self.run_persona_review().await;
        }
    }

    // ============================================================
    // Release
    // ============================================================

    /// Start a release. Fails fast with `ReleaseNotReady` before any
    /// network contact when the gate predicate is false.
    pub fn begin_release(&mut self) -> Result<PendingRelease, SessionError> {
        self.error_message = None;
        let Some(check_id) = self.check_id.clone() else {
            self.fail(SessionError::ReleaseNotReady);
            return Err(SessionError::ReleaseNotReady);
        };
        if !matches!(self.report.as_ref().map(|r| r.verdict), Some(Verdict::Ok)) {
            self.fail(SessionError::ReleaseNotReady);
            return Err(SessionError::ReleaseNotReady);
        }

        let token = self.release_slot.begin();
        info!(token, %check_id, "release started");
        Ok(PendingRelease {
            token,
            check_id,
            text: self.text.clone(),
            settings: self.settings,
        })
    }

    pub fn complete_release(
        &mut self,
        token: Generation,
        outcome: Result<ReleaseResult, RemoteFailure>,
    ) {
        match outcome {
            Ok(result) => {
                if !self.release_slot.finish(token, OpStatus::Success) {
                    debug!(token, "dropping superseded release result");
                    return;
                }
                info!("release complete");
                self.release = Some(result);
            }
            Err(failure) => {
                if !self.release_slot.finish(token, OpStatus::Error) {
                    debug!(token, "dropping superseded release failure");
                    return;
                }
                error!(status = failure.status_code, "release failed: {}", failure.message);
                self.error_message = Some(failure.message);
            }
        }
    }

    pub async fn run_release(&mut self) {
        let Ok(pending) = self.begin_release() else {
            return;
        };
        let outcome = self
            .service
            .release(&pending.check_id, &pending.text, &pending.settings)
            .await;
        self.complete_release(pending.token, outcome);
    }
}

impl<S> DocumentSession<S> {
    /// Apply an already-fetched fix to the document and report. Public
    /// so an embedding that fetched the fix itself can complete the
    /// patch without going back through [`DocumentSession::apply_fix`].
    pub fn apply_fix_locally(&mut self, finding_id: &FindingId, fix: &PatchFix) {
        let Some(report) = self.report.as_mut() else {
            self.fail(SessionError::NoReport);
            return;
        };
        match mutation::apply_replacement(
            &mut self.text,
            report,
            finding_id,
            &fix.original_text,
            &fix.replacement,
        ) {
            Ok(()) => {
                self.saved = false;
                if self.selected_finding.as_ref() == Some(finding_id) {
                    self.selected_finding = None;
                }
                info!(%finding_id, "fix applied");
            }
            Err(err) => self.fail(err),
        }
    }

    /// Remove a finding without a server round trip, deleting its
    /// anchor text from the document when still present.
    pub fn delete_finding(&mut self, finding_id: &FindingId) {
        let Some(report) = self.report.as_mut() else {
            self.fail(SessionError::NoReport);
            return;
        };
        let text_changed = mutation::delete_finding(&mut self.text, report, finding_id);
        if text_changed {
            self.saved = false;
        }
        if self.selected_finding.as_ref() == Some(finding_id) {
            self.selected_finding = None;
        }
        info!(%finding_id, text_changed, "finding deleted");
    }
}
