//! Result reconciliation.
//!
//! The provider's client-side success signal carries no payload guarantee:
//! the record only exists once the provider's backend callback has written
//! it to the store. The reconciler confirms that the record actually landed
//! by polling the backend status check: a short grace delay first, then
//! exponential backoff bounded by a deadline. Exceeding the deadline is a
//! distinct `TimedOut` outcome, not a silent `Pending`.

use crate::error::VerificationError;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use yam_types::VerificationRecord;

/// One status probe against the backend store, keyed by session identifier.
///
/// `Ok(None)` means no record yet. A transport error is indistinguishable
/// from "pending" at this layer.
#[async_trait::async_trait]
pub trait StatusProbe: Send + Sync {
    async fn check(&self, session_id: &str)
        -> Result<Option<VerificationRecord>, VerificationError>;
}

/// Timing policy for one reconciliation run.
#[derive(Clone, Copy, Debug)]
pub struct ReconcilePolicy {
    /// Delay before the first probe, giving the backend callback time to
    /// persist its record.
    pub grace: Duration,
    /// First retry delay; doubles per attempt.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Total budget for the run, measured from after the grace delay.
    pub deadline: Duration,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(1),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
            deadline: Duration::from_secs(30),
        }
    }
}

/// Final result of a reconciliation attempt.
#[derive(Clone, Debug)]
pub enum ReconcileOutcome {
    /// Store hit with a success record; the attempt is verified.
    Verified(VerificationRecord),
    /// Single-shot check found no success record; the caller decides
    /// whether to re-check.
    Pending,
    /// The bounded polling run exhausted its deadline without a success
    /// record appearing.
    TimedOut,
}

/// Polls a [`StatusProbe`] until a success record appears or the policy's
/// deadline passes.
pub struct Reconciler {
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    /// Bounded wait-for-record loop: grace delay, then probe with
    /// exponential backoff until `Verified` or the deadline.
    pub async fn run(
        &self,
        probe: &dyn StatusProbe,
        session_id: &str,
    ) -> ReconcileOutcome {
        tokio::time::sleep(self.policy.grace).await;

        let started = Instant::now();
        let mut backoff = self.policy.initial_backoff;

        loop {
            match probe.check(session_id).await {
                Ok(Some(record)) if record.is_success() => {
                    return ReconcileOutcome::Verified(record);
                }
                Ok(_) => {}
                Err(e) => {
                    // Transport failure is indistinguishable from pending.
                    debug!(session_id, "status probe failed, treating as pending: {e}");
                }
            }

            if started.elapsed() + backoff > self.policy.deadline {
                return ReconcileOutcome::TimedOut;
            }
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.policy.max_backoff);
        }
    }

    /// Single status check with no retry, for manual re-checks from the UI.
    pub async fn check_once(
        &self,
        probe: &dyn StatusProbe,
        session_id: &str,
    ) -> ReconcileOutcome {
        match probe.check(session_id).await {
            Ok(Some(record)) if record.is_success() => ReconcileOutcome::Verified(record),
            Ok(_) => ReconcileOutcome::Pending,
            Err(e) => {
                debug!(session_id, "status probe failed, treating as pending: {e}");
                ReconcileOutcome::Pending
            }
        }
    }
}
