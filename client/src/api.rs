//! HTTP client for the verification service.

use crate::error::ClientError;
use serde_json::json;
use std::time::Duration;
use yam_types::VerificationRecord;
use yam_verification::{StatusProbe, VerificationError};

/// Client for the service's `/verify` and `/check-verification` endpoints.
///
/// Applies its own connect/request timeouts so a hung status check cannot
/// block a reconciliation attempt forever.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client targeting the given base URL
    /// (e.g. `http://127.0.0.1:7080`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ClientError::Api(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Api(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ClientError::Api(format!(
                "{path} returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Status check against `/verify`: `Ok(None)` means no success record
    /// has appeared yet.
    pub async fn check_status(
        &self,
        session_id: &str,
    ) -> Result<Option<VerificationRecord>, ClientError> {
        let body = self
            .post_json(
                "/verify",
                json!({ "checkStatus": true, "sessionId": session_id }),
            )
            .await?;

        match body.get("status").and_then(|s| s.as_str()) {
            Some("pending") => Ok(None),
            Some("error") => {
                let reason = body
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or("unknown");
                Err(ClientError::Api(format!("status check rejected: {reason}")))
            }
            _ => {
                let record: VerificationRecord = serde_json::from_value(body)
                    .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
                Ok(Some(record))
            }
        }
    }

    /// Page-load lookup against `/check-verification`.
    pub async fn check_verification(
        &self,
        wallet_address: &str,
    ) -> Result<Option<VerificationRecord>, ClientError> {
        let body = self
            .post_json(
                "/check-verification",
                json!({ "walletAddress": wallet_address }),
            )
            .await?;

        if body.get("exists").and_then(|e| e.as_bool()) != Some(true) {
            return Ok(None);
        }
        let record: VerificationRecord =
            serde_json::from_value(body["verificationData"].clone())
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(Some(record))
    }
}

#[async_trait::async_trait]
impl StatusProbe for ApiClient {
    async fn check(
        &self,
        session_id: &str,
    ) -> Result<Option<VerificationRecord>, VerificationError> {
        self.check_status(session_id)
            .await
            .map_err(|e| VerificationError::Backend(e.to_string()))
    }
}
