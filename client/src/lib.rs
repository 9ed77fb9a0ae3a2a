//! Client-side verification state.
//!
//! This crate is the application-facing half of the verification flow: an
//! HTTP client for the service's endpoints, the session/profile state
//! holder with its persisted mirror (reload survival), the wallet-provider
//! seam, the ledger error translation table, and the flow driver that ties
//! the session tracker and reconciler together.

pub mod api;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod profile;
pub mod wallet;

pub use api::ApiClient;
pub use error::ClientError;
pub use flow::{FlowSettings, VerificationFlow};
pub use ledger::translate_ledger_error;
pub use profile::{ClientVerificationState, ProfileSession};
pub use wallet::{WalletProvider, WalletUser};
