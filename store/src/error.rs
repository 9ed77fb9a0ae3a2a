use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for yam_types::YamError {
    fn from(e: StoreError) -> Self {
        yam_types::YamError::Storage(e.to_string())
    }
}
