use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("wallet address is required before verification")]
    MissingWalletAddress,

    #[error("invalid session transition: {event} while {phase}")]
    InvalidTransition {
        phase: &'static str,
        event: &'static str,
    },

    #[error("proof backend error: {0}")]
    Backend(String),

    #[error("invalid proof backend response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl From<VerificationError> for yam_types::YamError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::MissingWalletAddress => yam_types::YamError::MissingWalletAddress,
            other => yam_types::YamError::Verification(other.to_string()),
        }
    }
}
