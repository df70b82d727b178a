//! Document session engine: keeps externally computed risk findings
//! consistent with a mutable document as the author edits, applies
//! fixes, and re-runs analysis.
//!
//! The [`DocumentSession`] aggregate owns all mutable state (text,
//! report, persona review, operation statuses) and is the only thing
//! that mutates it. The analysis service is an injected collaborator
//! behind the [`AnalysisService`] trait; the `analysis-client` crate
//! provides the HTTP implementation.

pub mod error;
pub mod mutation;
pub mod service;
pub mod status;
pub mod store;

pub use error::SessionError;
pub use service::{AnalysisService, CheckOutcome, PatchFix, RemoteFailure};
pub use status::{OpSlot, OpStatus};
pub use store::{DocumentSession, PendingCheck, PendingPersona, PendingRelease, SettingsPatch};
