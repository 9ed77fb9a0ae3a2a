//! Request handlers.
//!
//! `/verify` never uses non-2xx status codes: rejections and failures are
//! reported in the body as `{status: "error", result: false, reason}`, a
//! contract the frontend depends on.
//! `/check-verification` uses conventional status codes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use yam_types::{normalize_address, VerificationRecord};
use yam_verification::ProofPayload;

use crate::server::AppState;

// ── /verify ──────────────────────────────────────────────────────────────

/// Body of `POST /verify`: either a proof submission from the provider's
/// backend callback, or a status check (`checkStatus: true`) carrying the
/// session identifier.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub check_status: bool,
    pub session_id: Option<String>,
    pub attestation_id: Option<u32>,
    pub proof: Option<Value>,
    pub public_signals: Option<Value>,
    pub user_context_data: Option<String>,
}

fn error_body(reason: impl Into<String>) -> Value {
    json!({
        "status": "error",
        "result": false,
        "reason": reason.into(),
    })
}

/// The extraction result is taken explicitly so a malformed body becomes a
/// 200 error body like every other failure on this route, instead of the
/// extractor's own 4xx rejection.
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Json<Value> {
    match payload {
        Ok(Json(req)) => Json(verify_inner(&state, req).await),
        Err(rejection) => {
            warn!("rejected /verify body: {rejection}");
            Json(error_body(format!("Invalid request body: {rejection}")))
        }
    }
}

async fn verify_inner(state: &AppState, req: VerifyRequest) -> Value {
    if req.check_status {
        return check_status(state, req.session_id.as_deref()).await;
    }

    let (attestation_id, proof, public_signals, user_context_data) = match (
        req.attestation_id,
        req.proof,
        req.public_signals,
        req.user_context_data,
    ) {
        (Some(a), Some(p), Some(s), Some(c)) => (a, p, s, c),
        _ => {
            return error_body(
                "Proof, publicSignals, attestationId and userContextData are required",
            );
        }
    };

    let payload = ProofPayload {
        attestation_id,
        proof,
        public_signals,
        user_context_data,
    };

    let outcome = match state.verifier.verify(&payload).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("proof backend unreachable: {e}");
            return error_body(e.to_string());
        }
    };

    if !outcome.is_accepted() {
        info!(subject = %outcome.user_identifier, "proof rejected");
        return error_body(outcome.rejection_reason());
    }

    let normalized = normalize_address(&outcome.user_identifier);

    // Idempotent by identifier: a second successful attempt returns the
    // stored record unchanged.
    if let Some(existing) = state.store.get(&normalized).await {
        if existing.is_success() {
            info!(identifier = %normalized, "already verified, returning stored record");
            return serde_json::to_value(&existing).unwrap_or_else(|_| error_body("Internal server error"));
        }
    }

    let record = VerificationRecord::success(
        &outcome.user_identifier,
        outcome.nullifier.clone(),
        outcome.credential.clone(),
        outcome.raw.clone(),
    );

    if let Err(e) = state.store.put(&normalized, record.clone()).await {
        warn!(identifier = %normalized, "failed to persist verification record: {e}");
        return error_body("Failed to persist verification result");
    }

    info!(identifier = %normalized, "verification recorded");
    serde_json::to_value(&record).unwrap_or_else(|_| error_body("Internal server error"))
}

async fn check_status(state: &AppState, session_id: Option<&str>) -> Value {
    let session_id = match session_id {
        Some(id) if !id.is_empty() => id,
        _ => return error_body("sessionId is required for status checks"),
    };

    let normalized = normalize_address(session_id);
    match state.store.get(&normalized).await {
        Some(record) => {
            serde_json::to_value(&record).unwrap_or_else(|_| error_body("Internal server error"))
        }
        None => json!({ "status": "pending" }),
    }
}

// ── /check-verification ──────────────────────────────────────────────────

/// Body of `POST /check-verification`: the page-load lookup for an existing
/// verification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVerificationRequest {
    pub wallet_address: Option<String>,
}

pub async fn check_verification(
    State(state): State<AppState>,
    Json(req): Json<CheckVerificationRequest>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = check_verification_inner(&state, req).await;
    (status, Json(body))
}

async fn check_verification_inner(
    state: &AppState,
    req: CheckVerificationRequest,
) -> (StatusCode, Value) {
    let wallet = match req.wallet_address.as_deref() {
        Some(w) if !w.is_empty() => w,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Wallet address is required" }),
            );
        }
    };

    let normalized = normalize_address(wallet);
    match state.store.get(&normalized).await {
        Some(record) if record.is_success() => (
            StatusCode::OK,
            json!({ "exists": true, "verificationData": record }),
        ),
        _ => (
            StatusCode::OK,
            json!({ "exists": false, "verificationData": null }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use yam_store::{MemoryRecordStore, RecordStore};
    use yam_types::CredentialSubject;
    use yam_verification::{ProofOutcome, ProofVerifier, VerificationError};

    /// Verifier that returns a preset outcome or error.
    struct MockVerifier {
        result: Result<ProofOutcome, String>,
    }

    impl MockVerifier {
        fn accepting(subject: &str, nullifier: &str) -> Self {
            Self {
                result: Ok(ProofOutcome {
                    valid: true,
                    minimum_age_valid: true,
                    ofac_valid: true,
                    user_identifier: subject.to_string(),
                    nullifier: Some(nullifier.to_string()),
                    credential: CredentialSubject {
                        age: Some(25),
                        nationality: Some("FRA".into()),
                        gender: Some("F".into()),
                        ofac: Some(false),
                    },
                    raw: json!({"upstream": true}),
                }),
            }
        }

        fn rejecting_age(subject: &str) -> Self {
            Self {
                result: Ok(ProofOutcome {
                    valid: true,
                    minimum_age_valid: false,
                    ofac_valid: true,
                    user_identifier: subject.to_string(),
                    nullifier: None,
                    credential: CredentialSubject::default(),
                    raw: Value::Null,
                }),
            }
        }

        fn unreachable() -> Self {
            Self {
                result: Err("proof backend error: connection refused".into()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ProofVerifier for MockVerifier {
        async fn verify(&self, _: &ProofPayload) -> Result<ProofOutcome, VerificationError> {
            match &self.result {
                Ok(outcome) => Ok(outcome.clone()),
                Err(e) => Err(VerificationError::Backend(e.clone())),
            }
        }
    }

    fn state_with(verifier: MockVerifier) -> AppState {
        AppState {
            store: Arc::new(MemoryRecordStore::new()),
            verifier: Arc::new(verifier),
        }
    }

    fn proof_request(subject_context: &str) -> VerifyRequest {
        VerifyRequest {
            check_status: false,
            session_id: None,
            attestation_id: Some(1),
            proof: Some(json!({"pi_a": []})),
            public_signals: Some(json!(["sig"])),
            user_context_data: Some(subject_context.to_string()),
        }
    }

    const ABC_NORMALIZED: &str = "0x0000000000000000000000000000000000000abc";

    #[tokio::test]
    async fn missing_proof_yields_error_with_reason() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let mut req = proof_request("00ab");
        req.proof = None;
        let body = verify_inner(&state, req).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["result"], false);
        assert!(!body["reason"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_a_200_error_body() {
        use axum::extract::FromRequest;

        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));

        // A wrong-typed field fails extraction; the handler must still answer
        // with the route's error-body shape, not the extractor's rejection.
        for body in [
            r#"{"attestationId": "not-a-number"}"#,
            r#"{"proof": "#,
        ] {
            let request = axum::http::Request::builder()
                .method("POST")
                .uri("/verify")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(body))
                .unwrap();
            let payload = Json::<VerifyRequest>::from_request(request, &()).await;
            assert!(payload.is_err(), "body {body:?} should fail extraction");

            let response = verify(State(state.clone()), payload).await.0;
            assert_eq!(response["status"], "error");
            assert_eq!(response["result"], false);
            assert!(response["reason"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request body"));
        }
    }

    #[tokio::test]
    async fn accepted_proof_stores_record_under_normalized_key() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let body = verify_inner(&state, proof_request("00ab")).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["userIdentifier"], ABC_NORMALIZED);

        let stored = state.store.get(ABC_NORMALIZED).await.expect("stored");
        assert!(stored.is_success());
        assert_eq!(stored.nullifier.as_deref(), Some("n-1"));
        assert_eq!(stored.nationality.as_deref(), Some("FRA"));
    }

    #[tokio::test]
    async fn second_success_for_same_identifier_keeps_first_record() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        verify_inner(&state, proof_request("00ab")).await;
        let first = state.store.get(ABC_NORMALIZED).await.expect("stored");

        // A second attempt with a different nullifier must not replace it.
        let state2 = AppState {
            store: state.store.clone(),
            verifier: Arc::new(MockVerifier::accepting("ABC", "n-2")),
        };
        let body = verify_inner(&state2, proof_request("00ab")).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["nullifier"], "n-1");

        let after = state.store.get(ABC_NORMALIZED).await.expect("still there");
        assert_eq!(after, first);
    }

    #[tokio::test]
    async fn rejected_proof_maps_reason() {
        let state = state_with(MockVerifier::rejecting_age("0xABC"));
        let body = verify_inner(&state, proof_request("00ab")).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["reason"], "Minimum age verification failed");
        assert!(state.store.get(ABC_NORMALIZED).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_yields_error_body() {
        let state = state_with(MockVerifier::unreachable());
        let body = verify_inner(&state, proof_request("00ab")).await;
        assert_eq!(body["status"], "error");
        assert!(body["reason"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn store_write_failure_surfaces_generic_error() {
        let state = AppState {
            store: Arc::new(MemoryRecordStore::failing("disk full")),
            verifier: Arc::new(MockVerifier::accepting("0xABC", "n-1")),
        };
        let body = verify_inner(&state, proof_request("00ab")).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["reason"], "Failed to persist verification result");
    }

    #[tokio::test]
    async fn status_check_accepts_any_valid_form_of_the_identifier() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        verify_inner(&state, proof_request("00ab")).await;

        for form in ["ABC", "0xabc", ABC_NORMALIZED] {
            let body = verify_inner(
                &state,
                VerifyRequest {
                    check_status: true,
                    session_id: Some(form.to_string()),
                    attestation_id: None,
                    proof: None,
                    public_signals: None,
                    user_context_data: None,
                },
            )
            .await;
            assert_eq!(body["status"], "success", "form {form}");
            assert_eq!(body["userIdentifier"], ABC_NORMALIZED);
        }
    }

    #[tokio::test]
    async fn status_check_for_unknown_session_is_pending() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let body = verify_inner(
            &state,
            VerifyRequest {
                check_status: true,
                session_id: Some("0xdead".to_string()),
                attestation_id: None,
                proof: None,
                public_signals: None,
                user_context_data: None,
            },
        )
        .await;
        assert_eq!(body, json!({ "status": "pending" }));
    }

    #[tokio::test]
    async fn status_check_without_session_id_is_an_error() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let body = verify_inner(
            &state,
            VerifyRequest {
                check_status: true,
                session_id: None,
                attestation_id: None,
                proof: None,
                public_signals: None,
                user_context_data: None,
            },
        )
        .await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn check_verification_requires_a_wallet_address() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let (status, body) = check_verification_inner(
            &state,
            CheckVerificationRequest {
                wallet_address: None,
            },
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Wallet address is required");
    }

    #[tokio::test]
    async fn check_verification_finds_record_for_unprefixed_input() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        verify_inner(&state, proof_request("00ab")).await;

        let (status, body) = check_verification_inner(
            &state,
            CheckVerificationRequest {
                wallet_address: Some("ABC".to_string()),
            },
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exists"], true);
        assert_eq!(body["verificationData"]["userIdentifier"], ABC_NORMALIZED);
    }

    #[tokio::test]
    async fn check_verification_misses_unknown_wallet() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let (status, body) = check_verification_inner(
            &state,
            CheckVerificationRequest {
                wallet_address: Some("0xdead".to_string()),
            },
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["exists"], false);
        assert_eq!(body["verificationData"], Value::Null);
    }

    #[tokio::test]
    async fn check_verification_ignores_non_success_records() {
        let state = state_with(MockVerifier::accepting("0xABC", "n-1"));
        let mut record = VerificationRecord::success(
            "0xdead",
            None,
            CredentialSubject::default(),
            Value::Null,
        );
        record.status = yam_types::VerificationStatus::Pending;
        let id = record.user_identifier.clone();
        state.store.put(&id, record).await.expect("put");

        let (_, body) = check_verification_inner(
            &state,
            CheckVerificationRequest {
                wallet_address: Some("0xdead".to_string()),
            },
        )
        .await;
        assert_eq!(body["exists"], false);
    }
}
