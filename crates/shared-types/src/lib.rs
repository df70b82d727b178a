//! Shared domain types for the risk-checker workspace.
//!
//! The wire format matches the analysis service JSON (camelCase keys,
//! lowercase enum values), so these types serialize straight into the
//! request/response bodies.

pub mod persona;
pub mod release;
pub mod report;
pub mod settings;

pub use persona::{PersonaItem, PersonaReview, PersonaSummary};
pub use release::ReleaseResult;
pub use report::{
    Anchor, Category, CheckId, Finding, FindingId, Report, ReportSummary, Severity,
    SeverityCounts, Verdict,
};
pub use settings::{Audience, CheckSettings, PublishScope, RedactMode, SeverityFilter, Tone};
