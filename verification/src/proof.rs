//! Proof verifier seam.
//!
//! The zero-knowledge proof system is an external collaborator. This module
//! defines the payload/outcome types exchanged with it and an HTTP-backed
//! implementation that delegates to the configured proof backend.

use crate::error::VerificationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use yam_types::CredentialSubject;

/// One proof submission: the fields the provider's backend callback posts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofPayload {
    /// Document type (1 = passport, 2 = EU ID card, 3 = Aadhaar).
    pub attestation_id: u32,
    /// The zero-knowledge proof, opaque to this service.
    pub proof: serde_json::Value,
    /// Public signals array, opaque to this service.
    pub public_signals: serde_json::Value,
    /// User context data (hex string); the subject address is packed into
    /// its trailing bytes.
    pub user_context_data: String,
}

/// What the proof system reported for one submission.
#[derive(Clone, Debug)]
pub struct ProofOutcome {
    pub valid: bool,
    pub minimum_age_valid: bool,
    pub ofac_valid: bool,
    /// The verification subject (wallet address, not yet normalized).
    pub user_identifier: String,
    pub nullifier: Option<String>,
    pub credential: CredentialSubject,
    /// Full upstream response, retained for audit/debug.
    pub raw: serde_json::Value,
}

impl ProofOutcome {
    /// Whether every validity check passed.
    pub fn is_accepted(&self) -> bool {
        self.valid && self.minimum_age_valid && self.ofac_valid
    }

    /// User-facing rejection reason. Minimum-age failure is reported unless
    /// OFAC also failed, which takes precedence.
    pub fn rejection_reason(&self) -> String {
        let mut reason = "Verification failed".to_string();
        if !self.minimum_age_valid {
            reason = "Minimum age verification failed".to_string();
        }
        if !self.ofac_valid {
            reason = "OFAC verification failed".to_string();
        }
        reason
    }
}

/// Seam for the external proof system.
#[async_trait::async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Delegate cryptographic verification of one submission.
    ///
    /// `Err` means the backend could not be consulted at all; a rejected
    /// proof is an `Ok` outcome with validity flags unset.
    async fn verify(&self, payload: &ProofPayload) -> Result<ProofOutcome, VerificationError>;
}

// ── Remote implementation ───────────────────────────────────────────────

/// Shape of the proof backend's verification response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendResponse {
    #[serde(default)]
    is_valid_details: ValidityDetails,
    #[serde(default)]
    disclose_output: DiscloseOutput,
    #[serde(default)]
    user_data: UserData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidityDetails {
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    is_minimum_age_valid: bool,
    #[serde(default)]
    is_ofac_valid: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscloseOutput {
    #[serde(default)]
    nullifier: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    age: Option<u8>,
    #[serde(default)]
    ofac: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserData {
    #[serde(default)]
    user_identifier: Option<String>,
}

/// The subject address is packed into the trailing 40 hex characters of the
/// user context data; used when the backend does not echo the identifier.
///
/// The context data arrives over the wire and is not guaranteed to be hex,
/// so the tail is taken on character boundaries rather than byte offsets.
fn subject_from_context(user_context_data: &str) -> String {
    let bare = user_context_data
        .strip_prefix("0x")
        .unwrap_or(user_context_data);
    let tail_start = bare
        .char_indices()
        .rev()
        .nth(39)
        .map(|(i, _)| i)
        .unwrap_or(0);
    bare[tail_start..].to_string()
}

/// HTTP client delegating proof verification to the external backend.
pub struct RemoteProofVerifier {
    http: reqwest::Client,
    endpoint: String,
}

impl RemoteProofVerifier {
    /// Create a verifier targeting the given backend endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, VerificationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VerificationError::Backend(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ProofVerifier for RemoteProofVerifier {
    async fn verify(&self, payload: &ProofPayload) -> Result<ProofOutcome, VerificationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| VerificationError::Backend(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VerificationError::Backend(format!(
                "proof backend returned HTTP {}",
                response.status()
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        let parsed: BackendResponse = serde_json::from_value(raw.clone())
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        let user_identifier = parsed
            .user_data
            .user_identifier
            .unwrap_or_else(|| subject_from_context(&payload.user_context_data));

        Ok(ProofOutcome {
            valid: parsed.is_valid_details.is_valid,
            minimum_age_valid: parsed.is_valid_details.is_minimum_age_valid,
            ofac_valid: parsed.is_valid_details.is_ofac_valid,
            user_identifier,
            nullifier: parsed.disclose_output.nullifier,
            credential: CredentialSubject {
                age: parsed.disclose_output.age,
                nationality: parsed.disclose_output.nationality,
                gender: parsed.disclose_output.gender,
                ofac: parsed.disclose_output.ofac,
            },
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(valid: bool, age: bool, ofac: bool) -> ProofOutcome {
        ProofOutcome {
            valid,
            minimum_age_valid: age,
            ofac_valid: ofac,
            user_identifier: "0xabc".into(),
            nullifier: None,
            credential: CredentialSubject::default(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn accepted_requires_all_checks() {
        assert!(outcome(true, true, true).is_accepted());
        assert!(!outcome(false, true, true).is_accepted());
        assert!(!outcome(true, false, true).is_accepted());
        assert!(!outcome(true, true, false).is_accepted());
    }

    #[test]
    fn rejection_reason_precedence() {
        assert_eq!(
            outcome(false, true, true).rejection_reason(),
            "Verification failed"
        );
        assert_eq!(
            outcome(true, false, true).rejection_reason(),
            "Minimum age verification failed"
        );
        // OFAC failure takes precedence over minimum age.
        assert_eq!(
            outcome(true, false, false).rejection_reason(),
            "OFAC verification failed"
        );
    }

    #[test]
    fn subject_falls_back_to_context_tail() {
        let context = format!("{}{}", "ab".repeat(32), "c".repeat(40));
        assert_eq!(subject_from_context(&context), "c".repeat(40));
        // Shorter-than-40 context yields whatever is there; normalization
        // pads it downstream.
        assert_eq!(subject_from_context("0xabc"), "abc");
    }

    #[test]
    fn subject_tail_handles_non_ascii_context() {
        // A multi-byte character straddling the 40-bytes-from-the-end offset
        // must not make the tail extraction panic.
        let context = format!("abcé{}", "f".repeat(39));
        assert_eq!(subject_from_context(&context), format!("é{}", "f".repeat(39)));

        // Entirely multi-byte, shorter than 40 characters.
        assert_eq!(subject_from_context("ééé"), "ééé");
    }

    #[test]
    fn payload_serializes_with_wire_field_names() {
        let payload = ProofPayload {
            attestation_id: 1,
            proof: serde_json::json!({"pi_a": []}),
            public_signals: serde_json::json!([]),
            user_context_data: "00ab".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("attestationId").is_some());
        assert!(json.get("publicSignals").is_some());
        assert!(json.get("userContextData").is_some());
    }

    #[test]
    fn backend_response_parses_with_missing_sections() {
        let parsed: BackendResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!parsed.is_valid_details.is_valid);
        assert!(parsed.user_data.user_identifier.is_none());
    }
}
