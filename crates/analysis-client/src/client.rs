//! reqwest client for the analysis service endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use session_core::{AnalysisService, CheckOutcome, PatchFix, RemoteFailure};
use shared_types::{CheckId, CheckSettings, FindingId, PersonaReview, ReleaseResult, Report};

use crate::error::{fallback_detail, ClientError};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Connection settings for [`HttpAnalysisService`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Read configuration from `RISKCHECK_API_BASE_URL`,
    /// `RISKCHECK_API_KEY` and `RISKCHECK_API_KEY_HEADER`. The
    /// embedding application is responsible for loading any `.env`
    /// file beforehand.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RISKCHECK_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("RISKCHECK_API_KEY").ok(),
            api_key_header: std::env::var("RISKCHECK_API_KEY_HEADER")
                .unwrap_or_else(|_| DEFAULT_API_KEY_HEADER.to_string()),
        }
    }
}

/// HTTP implementation of the analysis service port.
pub struct HttpAnalysisService {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpAnalysisService {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        // Misconfigured credentials short-circuit before any network
        // contact.
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ClientError::MissingCredential)?;

        let url = format!("{}{}", self.config.base_url, path);
        debug!(%url, "analysis request");

        let response = self
            .http
            .post(&url)
            .header(&self.config.api_key_header, api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<ErrorEnvelope>().await.ok();
            let (message, code) = match detail.and_then(|e| e.detail) {
                Some(d) => (d.message, d.code),
                None => fallback_detail(status.as_u16()),
            };
            return Err(ClientError::Api {
                status_code: status.as_u16(),
                message,
                code,
            });
        }

        Ok(response.json().await?)
    }
}

// Wire shapes. The service speaks camelCase JSON and wraps failures in
// a `detail` envelope whose code field is spelled `error`.

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(alias = "error")]
    code: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    text: &'a str,
    settings: &'a CheckSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PatchRequest<'a> {
    check_id: &'a CheckId,
    finding_id: &'a FindingId,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseRequest<'a> {
    check_id: &'a CheckId,
    text: &'a str,
    settings: &'a CheckSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    check_id: CheckId,
    report: Report,
}

#[derive(Debug, Deserialize)]
struct RecheckResponse {
    report: Report,
}

#[derive(Debug, Deserialize)]
struct PatchResponse {
    apply: PatchApply,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchApply {
    original_text: String,
    replacement: String,
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn check(
        &self,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<CheckOutcome, RemoteFailure> {
        let response: CheckResponse = self
            .post("/v1/checks", &CheckRequest { text, settings })
            .await
            .map_err(RemoteFailure::from)?;
        Ok(CheckOutcome {
            check_id: response.check_id,
            report: response.report,
        })
    }

    async fn recheck(
        &self,
        check_id: &CheckId,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<Report, RemoteFailure> {
        let path = format!("/v1/checks/{}/recheck", check_id);
        let response: RecheckResponse = self
            .post(&path, &CheckRequest { text, settings })
            .await
            .map_err(RemoteFailure::from)?;
        Ok(response.report)
    }

    async fn apply_fix(
        &self,
        check_id: &CheckId,
        finding_id: &FindingId,
        text: &str,
    ) -> Result<PatchFix, RemoteFailure> {
        let response: PatchResponse = self
            .post(
                "/v1/patches",
                &PatchRequest {
                    check_id,
                    finding_id,
                    text,
                },
            )
            .await
            .map_err(RemoteFailure::from)?;
        Ok(PatchFix {
            original_text: response.apply.original_text,
            replacement: response.apply.replacement,
        })
    }

    async fn release(
        &self,
        check_id: &CheckId,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<ReleaseResult, RemoteFailure> {
        self.post(
            "/v1/release",
            &ReleaseRequest {
                check_id,
                text,
                settings,
            },
        )
        .await
        .map_err(RemoteFailure::from)
    }

    async fn persona_review(
        &self,
        text: &str,
        settings: &CheckSettings,
    ) -> Result<PersonaReview, RemoteFailure> {
        self.post("/v1/persona-review", &CheckRequest { text, settings })
            .await
            .map_err(RemoteFailure::from)
    }
}
