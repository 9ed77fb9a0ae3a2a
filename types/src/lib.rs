//! Fundamental types for the YAM verification service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: wallet addresses (and their normalization into storage keys),
//! timestamps, verification records, and the common error type.

pub mod address;
pub mod error;
pub mod record;
pub mod time;

pub use address::{normalize_address, WalletAddress};
pub use error::YamError;
pub use record::{CredentialSubject, VerificationRecord, VerificationStatus};
pub use time::Timestamp;
