//! Verification record: the stored outcome of one identity-proof attempt.

use crate::{normalize_address, Timestamp};
use serde::{Deserialize, Serialize};

/// Outcome status of a verification attempt, serialized lowercase to match
/// the wire contract (`"success"`, `"error"`, `"pending"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Success,
    Error,
    Pending,
}

/// Attributes disclosed by the proof, each optional depending on what the
/// proof actually revealed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ofac: Option<bool>,
}

/// The stored outcome of one identity-verification attempt, keyed in the
/// record store by the normalized `user_identifier`.
///
/// At most one record exists per normalized identifier: a second successful
/// attempt for an already-verified identifier returns the existing record
/// unchanged. Records are never deleted; there is no revocation path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub status: VerificationStatus,
    /// The wallet address used as the verification subject; primary key
    /// after normalization.
    pub user_identifier: String,
    /// Opaque uniqueness token from the proof system, used to prevent
    /// duplicate verified identities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ofac_flag: Option<bool>,
    /// Full upstream response, retained for audit/debug.
    #[serde(default)]
    pub raw: serde_json::Value,
    pub verified_at: Timestamp,
}

impl VerificationRecord {
    /// Build a successful record from disclosed attributes.
    ///
    /// The identifier is normalized here so the record's own key field can
    /// never disagree with the key it is stored under.
    pub fn success(
        user_identifier: &str,
        nullifier: Option<String>,
        credential: CredentialSubject,
        raw: serde_json::Value,
    ) -> Self {
        Self {
            status: VerificationStatus::Success,
            user_identifier: normalize_address(user_identifier),
            nullifier,
            nationality: credential.nationality,
            age: credential.age,
            gender: credential.gender,
            ofac_flag: credential.ofac,
            raw,
            verified_at: Timestamp::now(),
        }
    }

    /// Whether this record represents a confirmed verification.
    pub fn is_success(&self) -> bool {
        self.status == VerificationStatus::Success
    }

    /// The disclosed attributes as a `CredentialSubject`.
    pub fn credential(&self) -> CredentialSubject {
        CredentialSubject {
            age: self.age,
            nationality: self.nationality.clone(),
            gender: self.gender.clone(),
            ofac: self.ofac_flag,
        }
    }
}
