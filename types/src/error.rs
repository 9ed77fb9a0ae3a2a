//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the YAM verification service.
#[derive(Debug, Error)]
pub enum YamError {
    #[error("wallet address is required")]
    MissingWalletAddress,

    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("verification error: {0}")]
    Verification(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}
