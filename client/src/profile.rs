//! Session/profile state holder.
//!
//! Holds the browser-session analog of a verification record: an in-memory
//! state plus a JSON mirror file for reload survival. On startup the mirror
//! is loaded optimistically without re-validating against the server store
//! (accepted staleness: the design does not re-check on load). Cleared on
//! explicit logout.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;
use yam_types::{Timestamp, VerificationRecord};

/// Ephemeral mirror of a verification record, as the application sees it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientVerificationState {
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// The proof system's uniqueness token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
}

impl From<&VerificationRecord> for ClientVerificationState {
    fn from(record: &VerificationRecord) -> Self {
        Self {
            is_verified: record.is_success(),
            age: record.age,
            country: record.nationality.clone(),
            gender: record.gender.clone(),
            unique_id: record.nullifier.clone(),
            verified_at: Some(record.verified_at),
        }
    }
}

/// Lifecycle-scoped holder of the current verification state, constructed
/// at application/session start and torn down at logout, passed
/// explicitly rather than living in an ambient singleton.
#[derive(Debug)]
pub struct ProfileSession {
    state: Option<ClientVerificationState>,
    mirror: PathBuf,
}

impl ProfileSession {
    /// Default mirror file name.
    pub const DEFAULT_MIRROR: &'static str = "yam-verification-profile.json";

    /// Open a session, loading an existing mirror optimistically. An
    /// unreadable or unparsable mirror yields an unverified session.
    pub fn open(mirror: impl Into<PathBuf>) -> Self {
        let mirror = mirror.into();
        let state = match std::fs::read_to_string(&mirror) {
            Ok(data) => match serde_json::from_str::<ClientVerificationState>(&data) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!(path = %mirror.display(), "unparsable profile mirror, ignoring: {e}");
                    None
                }
            },
            Err(_) => None,
        };
        Self { state, mirror }
    }

    pub fn mirror_path(&self) -> &Path {
        &self.mirror
    }

    pub fn state(&self) -> Option<&ClientVerificationState> {
        self.state.as_ref()
    }

    /// Whether the current state represents a confirmed verification.
    pub fn is_verified(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_verified)
    }

    /// Adopt a reconciled record: update in-memory state and the mirror.
    pub fn apply_record(&mut self, record: &VerificationRecord) -> Result<(), ClientError> {
        let state = ClientVerificationState::from(record);
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| ClientError::Profile(e.to_string()))?;
        std::fs::write(&self.mirror, json)
            .map_err(|e| ClientError::Profile(format!("{}: {e}", self.mirror.display())))?;
        self.state = Some(state);
        Ok(())
    }

    /// Logout: clear in-memory state and remove the mirror file.
    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.state = None;
        match std::fs::remove_file(&self.mirror) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Profile(format!(
                "{}: {e}",
                self.mirror.display()
            ))),
        }
    }
}
