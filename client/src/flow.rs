//! Flow driver: ties the session tracker, the reconciler, and the profile
//! together into the connect → prove → reconcile → cache sequence.

use crate::error::ClientError;
use crate::profile::ProfileSession;
use crate::wallet::WalletProvider;
use std::sync::Arc;
use tracing::info;
use yam_types::WalletAddress;
use yam_verification::{
    DisclosureRequirements, ReconcileOutcome, ReconcilePolicy, Reconciler, SessionDescriptor,
    SessionPhase, SessionTracker, StatusProbe,
};

/// Deployment settings for session descriptors.
#[derive(Clone, Debug)]
pub struct FlowSettings {
    pub app_name: String,
    pub scope: String,
    /// Callback endpoint handed to the proof provider.
    pub endpoint: String,
    /// Base URL for deep links into the external proof application.
    pub deep_link_base: String,
    pub disclosures: DisclosureRequirements,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            app_name: "Yam Marketplace".to_string(),
            scope: "yam-marketplace".to_string(),
            endpoint: "http://127.0.0.1:7080/verify".to_string(),
            deep_link_base: "https://redirect.self.xyz".to_string(),
            disclosures: DisclosureRequirements::default(),
        }
    }
}

/// Drives one verification attempt end to end and keeps the profile in
/// sync with reconciled results.
pub struct VerificationFlow {
    tracker: SessionTracker,
    reconciler: Reconciler,
    probe: Arc<dyn StatusProbe>,
    profile: ProfileSession,
    settings: FlowSettings,
}

impl VerificationFlow {
    pub fn new(
        probe: Arc<dyn StatusProbe>,
        profile: ProfileSession,
        settings: FlowSettings,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            tracker: SessionTracker::new(),
            reconciler: Reconciler::new(policy),
            probe,
            profile,
            settings,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.tracker.phase()
    }

    pub fn profile(&self) -> &ProfileSession {
        &self.profile
    }

    pub fn last_error(&self) -> Option<&str> {
        self.tracker.last_error()
    }

    /// Deep link for the current session, if one is in flight.
    pub fn deep_link(&self) -> Option<String> {
        self.tracker
            .descriptor()
            .map(|d| d.deep_link(&self.settings.deep_link_base))
    }

    /// Begin a verification attempt for a connected wallet. Returns the
    /// descriptor for rendering (e.g. as a scannable code).
    pub fn start(&mut self, wallet: &WalletAddress) -> Result<&SessionDescriptor, ClientError> {
        let descriptor = SessionDescriptor::new(
            wallet,
            self.settings.app_name.clone(),
            self.settings.scope.clone(),
            self.settings.endpoint.clone(),
            self.settings.disclosures.clone(),
        )?;
        self.tracker.initiate(descriptor)?;
        Ok(self.tracker.descriptor().expect("descriptor just set"))
    }

    /// Connect a wallet through the provider and begin verification.
    pub async fn connect(
        &mut self,
        provider: &dyn WalletProvider,
    ) -> Result<&SessionDescriptor, ClientError> {
        let user = provider.authenticate().await?;
        let wallet = user
            .address()
            .cloned()
            .ok_or(ClientError::Wallet("no wallet address connected".into()))?;
        self.start(&wallet)
    }

    /// The provider's client-side flow reported success: reconcile against
    /// the backend store and, on a confirmed record, update the profile.
    pub async fn on_proof_success(&mut self) -> Result<ReconcileOutcome, ClientError> {
        self.tracker.proof_succeeded()?;
        let session_id = self
            .tracker
            .descriptor()
            .expect("descriptor present while reconciling")
            .session_id
            .clone();

        let outcome = self
            .reconciler
            .run(self.probe.as_ref(), session_id.as_str())
            .await;

        match &outcome {
            ReconcileOutcome::Verified(record) => {
                self.tracker.resolve_verified()?;
                self.profile.apply_record(record)?;
                info!(identifier = %record.user_identifier, "verification reconciled");
            }
            ReconcileOutcome::Pending => {
                self.tracker.resolve_pending(None)?;
            }
            ReconcileOutcome::TimedOut => {
                self.tracker.resolve_pending(Some(
                    "verification timed out before a record appeared".to_string(),
                ))?;
            }
        }
        Ok(outcome)
    }

    /// The provider's client-side flow reported an error.
    pub fn on_proof_error(&mut self, reason: impl Into<String>) -> Result<(), ClientError> {
        self.tracker.proof_failed(reason)?;
        Ok(())
    }

    /// Manual re-check (the user clicking "Refresh" after a Pending
    /// outcome). A single status probe, no retry loop; a confirmed record
    /// updates the profile even though the attempt itself stays terminal.
    pub async fn recheck(&mut self, session_id: &WalletAddress) -> Result<ReconcileOutcome, ClientError> {
        let outcome = self
            .reconciler
            .check_once(self.probe.as_ref(), session_id.as_str())
            .await;
        if let ReconcileOutcome::Verified(record) = &outcome {
            self.profile.apply_record(record)?;
        }
        Ok(outcome)
    }

    /// Explicit cancel: back to Idle, profile untouched.
    pub fn cancel(&mut self) {
        self.tracker.cancel();
    }

    /// Logout: disconnect the wallet, clear the profile and its mirror.
    pub async fn disconnect(&mut self, provider: &dyn WalletProvider) -> Result<(), ClientError> {
        provider.unauthenticate().await?;
        self.profile.clear()?;
        self.tracker.cancel();
        Ok(())
    }
}
