//! Identity-verification session flow.
//!
//! One verification attempt moves through a small state machine:
//! a session descriptor is built for a connected wallet, the external proof
//! provider performs its cryptographic exchange out of band, the provider's
//! backend callback persists a record, and the reconciler confirms through
//! the backend that the record actually landed before the result is trusted.
//!
//! The proof system itself is external; [`ProofVerifier`] is the seam.

pub mod error;
pub mod proof;
pub mod reconcile;
pub mod session;

pub use error::VerificationError;
pub use proof::{ProofOutcome, ProofPayload, ProofVerifier, RemoteProofVerifier};
pub use reconcile::{ReconcileOutcome, ReconcilePolicy, Reconciler, StatusProbe};
pub use session::{DisclosureRequirements, SessionDescriptor, SessionPhase, SessionTracker};
