//! Verification session descriptors and per-attempt state tracking.

use crate::error::VerificationError;
use serde::{Deserialize, Serialize};
use yam_types::WalletAddress;

/// What the proof must disclose for this deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureRequirements {
    pub minimum_age: u8,
    pub nationality: bool,
    pub gender: bool,
    /// OFAC screening on/off depending on deployment; must match the
    /// backend verifier's configuration.
    pub ofac: bool,
    #[serde(default)]
    pub excluded_countries: Vec<String>,
}

impl Default for DisclosureRequirements {
    fn default() -> Self {
        Self {
            minimum_age: 18,
            nationality: true,
            gender: true,
            ofac: false,
            excluded_countries: Vec::new(),
        }
    }
}

/// Everything the external proof application needs to run one verification
/// session. The wallet address serves as both session identifier and
/// proof-subject identifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub session_id: WalletAddress,
    pub user_id: WalletAddress,
    pub app_name: String,
    pub scope: String,
    /// Callback endpoint the provider's backend posts the proof to.
    pub endpoint: String,
    pub user_defined_data: String,
    pub disclosures: DisclosureRequirements,
}

impl SessionDescriptor {
    /// Build a descriptor for a connected wallet.
    ///
    /// An absent wallet address is a precondition violation reported to the
    /// caller, never silently defaulted.
    pub fn new(
        wallet: &WalletAddress,
        app_name: impl Into<String>,
        scope: impl Into<String>,
        endpoint: impl Into<String>,
        disclosures: DisclosureRequirements,
    ) -> Result<Self, VerificationError> {
        if wallet.is_empty() {
            return Err(VerificationError::MissingWalletAddress);
        }
        Ok(Self {
            session_id: wallet.clone(),
            user_id: wallet.clone(),
            app_name: app_name.into(),
            scope: scope.into(),
            endpoint: endpoint.into(),
            user_defined_data: "YAM Marketplace Verification".to_string(),
            disclosures,
        })
    }

    /// Deep link for opening the session directly in the external proof
    /// application (the alternative to scanning the rendered code).
    pub fn deep_link(&self, link_base: &str) -> String {
        format!(
            "{}?scope={}&sessionId={}&endpoint={}",
            link_base.trim_end_matches('/'),
            self.scope,
            self.session_id,
            self.endpoint,
        )
    }
}

/// Phase of one verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session in flight.
    Idle,
    /// Descriptor issued; the provider's out-of-band exchange is running.
    AwaitingProof,
    /// Client-side success signalled; confirming against the backend store.
    Reconciling,
    /// Store hit with a success record. Terminal.
    Verified,
    /// Store miss or non-success record. Terminal for this attempt; a fresh
    /// attempt must re-enter AwaitingProof.
    Pending,
}

impl SessionPhase {
    fn name(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::AwaitingProof => "AwaitingProof",
            SessionPhase::Reconciling => "Reconciling",
            SessionPhase::Verified => "Verified",
            SessionPhase::Pending => "Pending",
        }
    }
}

/// Tracks one verification attempt through its phases, rejecting
/// out-of-order events.
#[derive(Debug)]
pub struct SessionTracker {
    phase: SessionPhase,
    descriptor: Option<SessionDescriptor>,
    last_error: Option<String>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            descriptor: None,
            last_error: None,
        }
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn descriptor(&self) -> Option<&SessionDescriptor> {
        self.descriptor.as_ref()
    }

    /// Error surfaced by the most recent failed or timed-out attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Begin a new attempt. Allowed from Idle and from the Pending terminal
    /// (a fresh attempt re-enters AwaitingProof).
    pub fn initiate(&mut self, descriptor: SessionDescriptor) -> Result<(), VerificationError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Pending => {
                self.phase = SessionPhase::AwaitingProof;
                self.descriptor = Some(descriptor);
                self.last_error = None;
                Ok(())
            }
            other => Err(VerificationError::InvalidTransition {
                phase: other.name(),
                event: "initiate",
            }),
        }
    }

    /// The provider's client-side flow reported success (a signal carrying
    /// no payload guarantee); move to reconciliation.
    pub fn proof_succeeded(&mut self) -> Result<(), VerificationError> {
        match self.phase {
            SessionPhase::AwaitingProof => {
                self.phase = SessionPhase::Reconciling;
                Ok(())
            }
            other => Err(VerificationError::InvalidTransition {
                phase: other.name(),
                event: "proof_succeeded",
            }),
        }
    }

    /// The provider's client-side flow reported an error; back to Idle
    /// with the error surfaced.
    pub fn proof_failed(&mut self, reason: impl Into<String>) -> Result<(), VerificationError> {
        match self.phase {
            SessionPhase::AwaitingProof => {
                self.phase = SessionPhase::Idle;
                self.descriptor = None;
                self.last_error = Some(reason.into());
                Ok(())
            }
            other => Err(VerificationError::InvalidTransition {
                phase: other.name(),
                event: "proof_failed",
            }),
        }
    }

    /// Reconciliation found a success record.
    pub fn resolve_verified(&mut self) -> Result<(), VerificationError> {
        match self.phase {
            SessionPhase::Reconciling => {
                self.phase = SessionPhase::Verified;
                Ok(())
            }
            other => Err(VerificationError::InvalidTransition {
                phase: other.name(),
                event: "resolve_verified",
            }),
        }
    }

    /// Reconciliation came up empty (store miss, non-success record, or
    /// deadline exceeded). `reason` is surfaced for timed-out attempts.
    pub fn resolve_pending(&mut self, reason: Option<String>) -> Result<(), VerificationError> {
        match self.phase {
            SessionPhase::Reconciling => {
                self.phase = SessionPhase::Pending;
                self.last_error = reason;
                Ok(())
            }
            other => Err(VerificationError::InvalidTransition {
                phase: other.name(),
                event: "resolve_pending",
            }),
        }
    }

    /// Explicit cancel, allowed from any state.
    pub fn cancel(&mut self) {
        self.phase = SessionPhase::Idle;
        self.descriptor = None;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SessionDescriptor {
        SessionDescriptor::new(
            &WalletAddress::new("0xABC"),
            "Yam Marketplace",
            "yam-marketplace",
            "https://yam.example/api/verify",
            DisclosureRequirements::default(),
        )
        .expect("valid descriptor")
    }

    #[test]
    fn descriptor_requires_a_wallet_address() {
        let err = SessionDescriptor::new(
            &WalletAddress::new(""),
            "Yam Marketplace",
            "yam-marketplace",
            "https://yam.example/api/verify",
            DisclosureRequirements::default(),
        );
        assert!(matches!(err, Err(VerificationError::MissingWalletAddress)));
    }

    #[test]
    fn session_id_is_the_normalized_wallet() {
        let d = descriptor();
        assert_eq!(
            d.session_id.as_str(),
            "0x0000000000000000000000000000000000000abc"
        );
        assert_eq!(d.session_id, d.user_id);
    }

    #[test]
    fn deep_link_carries_scope_and_session() {
        let link = descriptor().deep_link("https://proof.example/open/");
        assert!(link.starts_with("https://proof.example/open?"));
        assert!(link.contains("scope=yam-marketplace"));
        assert!(link.contains("sessionId=0x0000000000000000000000000000000000000abc"));
    }

    #[test]
    fn happy_path_reaches_verified() {
        let mut tracker = SessionTracker::new();
        assert_eq!(tracker.phase(), SessionPhase::Idle);
        tracker.initiate(descriptor()).expect("initiate");
        assert_eq!(tracker.phase(), SessionPhase::AwaitingProof);
        tracker.proof_succeeded().expect("proof success");
        assert_eq!(tracker.phase(), SessionPhase::Reconciling);
        tracker.resolve_verified().expect("verified");
        assert_eq!(tracker.phase(), SessionPhase::Verified);
    }

    #[test]
    fn store_miss_ends_in_pending_and_allows_a_fresh_attempt() {
        let mut tracker = SessionTracker::new();
        tracker.initiate(descriptor()).expect("initiate");
        tracker.proof_succeeded().expect("proof success");
        tracker.resolve_pending(None).expect("pending");
        assert_eq!(tracker.phase(), SessionPhase::Pending);

        // A fresh attempt re-enters AwaitingProof.
        tracker.initiate(descriptor()).expect("re-initiate");
        assert_eq!(tracker.phase(), SessionPhase::AwaitingProof);
    }

    #[test]
    fn proof_error_returns_to_idle_with_error_surfaced() {
        let mut tracker = SessionTracker::new();
        tracker.initiate(descriptor()).expect("initiate");
        tracker.proof_failed("provider rejected the proof").expect("proof error");
        assert_eq!(tracker.phase(), SessionPhase::Idle);
        assert_eq!(tracker.last_error(), Some("provider rejected the proof"));
        assert!(tracker.descriptor().is_none());
    }

    #[test]
    fn cancel_returns_to_idle_from_any_state() {
        let mut tracker = SessionTracker::new();
        tracker.initiate(descriptor()).expect("initiate");
        tracker.proof_succeeded().expect("proof success");
        tracker.cancel();
        assert_eq!(tracker.phase(), SessionPhase::Idle);
        assert!(tracker.descriptor().is_none());
    }

    #[test]
    fn verified_is_terminal() {
        let mut tracker = SessionTracker::new();
        tracker.initiate(descriptor()).expect("initiate");
        tracker.proof_succeeded().expect("proof success");
        tracker.resolve_verified().expect("verified");
        assert!(tracker.initiate(descriptor()).is_err());
        assert!(tracker.proof_succeeded().is_err());
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.proof_succeeded().is_err());
        assert!(tracker.resolve_verified().is_err());
        assert!(tracker.resolve_pending(None).is_err());
        assert_eq!(tracker.phase(), SessionPhase::Idle);
    }

    #[test]
    fn timed_out_reason_is_surfaced_on_pending() {
        let mut tracker = SessionTracker::new();
        tracker.initiate(descriptor()).expect("initiate");
        tracker.proof_succeeded().expect("proof success");
        tracker
            .resolve_pending(Some("verification timed out".into()))
            .expect("pending");
        assert_eq!(tracker.last_error(), Some("verification timed out"));
    }
}
