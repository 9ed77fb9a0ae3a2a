use thiserror::Error;
use yam_verification::VerificationError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API error: {0}")]
    Api(String),

    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    #[error("profile storage error: {0}")]
    Profile(String),

    #[error("wallet provider error: {0}")]
    Wallet(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}
