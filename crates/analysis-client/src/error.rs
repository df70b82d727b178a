//! Error types for the analysis service client.

use session_core::RemoteFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key configured; raised before any network call.
    #[error("API key is missing. Set RISKCHECK_API_KEY.")]
    MissingCredential,

    /// Non-2xx response from the service.
    #[error("{message}")]
    Api {
        status_code: u16,
        message: String,
        code: Option<String>,
    },

    /// Connection-level failure before a response arrived.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<ClientError> for RemoteFailure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingCredential => RemoteFailure {
                status_code: 401,
                message: err.to_string(),
                code: Some("MISSING_API_KEY".to_string()),
            },
            ClientError::Api {
                status_code,
                message,
                code,
            } => RemoteFailure {
                status_code,
                message,
                code,
            },
            ClientError::Transport(_) => RemoteFailure {
                status_code: 0,
                message: err.to_string(),
                code: None,
            },
        }
    }
}

/// Canned detail for error responses whose body could not be decoded.
pub(crate) fn fallback_detail(status_code: u16) -> (String, Option<String>) {
    match status_code {
        401 => ("Unauthorized".to_string(), Some("UNAUTHORIZED".to_string())),
        403 => ("Forbidden".to_string(), Some("FORBIDDEN".to_string())),
        404 => (
            "Resource not found".to_string(),
            Some("NOT_FOUND".to_string()),
        ),
        409 => (
            "Release conditions not met".to_string(),
            Some("CONFLICT".to_string()),
        ),
        500 => (
            "Internal server error".to_string(),
            Some("SERVER_ERROR".to_string()),
        ),
        502 => (
            "Service unavailable".to_string(),
            Some("BAD_GATEWAY".to_string()),
        ),
        other => (format!("Request failed with status {}", other), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_maps_to_401_remote_failure() {
        let failure: RemoteFailure = ClientError::MissingCredential.into();
        assert_eq!(failure.status_code, 401);
        assert_eq!(failure.code.as_deref(), Some("MISSING_API_KEY"));
        assert!(failure.message.contains("RISKCHECK_API_KEY"));
    }

    #[test]
    fn test_api_error_passes_message_through() {
        let failure: RemoteFailure = ClientError::Api {
            status_code: 429,
            message: "quota exhausted".to_string(),
            code: Some("RESOURCE_EXHAUSTED".to_string()),
        }
        .into();
        assert_eq!(failure.status_code, 429);
        assert_eq!(failure.message, "quota exhausted");
    }

    #[test]
    fn test_fallback_details_by_status() {
        assert_eq!(fallback_detail(409).0, "Release conditions not met");
        assert_eq!(fallback_detail(502).0, "Service unavailable");
        assert_eq!(fallback_detail(418).0, "Request failed with status 418");
        assert!(fallback_detail(418).1.is_none());
    }
}
