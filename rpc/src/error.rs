//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<yam_store::StoreError> for RpcError {
    fn from(e: yam_store::StoreError) -> Self {
        RpcError::Store(e.to_string())
    }
}
