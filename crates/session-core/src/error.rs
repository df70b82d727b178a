//! Error taxonomy for session operations.

use thiserror::Error;

use crate::service::RemoteFailure;

/// Failures surfaced to the author. Local precondition failures leave
/// all session state untouched; remote failures are never retried
/// automatically.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The patch's original text is no longer present in the document;
    /// the document changed since the fix was computed.
    #[error("Original text not found in document")]
    AnchorNotFound,

    /// Release requires an established check session and an `ok`
    /// verdict on the current report.
    #[error("Release conditions not met. Verdict must be \"ok\".")]
    ReleaseNotReady,

    /// Operation needs a report that does not exist yet.
    #[error("No report available")]
    NoReport,

    /// Operation needs a check session that has not been established.
    #[error("No active check session")]
    NoCheckSession,

    /// The analysis service rejected or failed the request. The
    /// message is surfaced verbatim.
    #[error("{0}")]
    Remote(#[from] RemoteFailure),
}

impl SessionError {
    /// Local precondition failures, as opposed to remote ones.
    pub fn is_local(&self) -> bool {
        !matches!(self, SessionError::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_is_surfaced_verbatim() {
        let err = SessionError::Remote(RemoteFailure {
            status_code: 429,
            message: "quota exhausted, retry later".to_string(),
            code: Some("RESOURCE_EXHAUSTED".to_string()),
        });
        assert_eq!(err.to_string(), "quota exhausted, retry later");
        assert!(!err.is_local());
    }

    #[test]
    fn test_local_errors_are_local() {
        assert!(SessionError::AnchorNotFound.is_local());
        assert!(SessionError::ReleaseNotReady.is_local());
        assert!(SessionError::NoReport.is_local());
        assert!(SessionError::NoCheckSession.is_local());
    }
}
