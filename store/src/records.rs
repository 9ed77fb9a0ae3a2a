//! The record store trait.

use crate::StoreError;
use std::collections::HashMap;
use yam_types::VerificationRecord;

/// The full stored mapping: normalized identifier -> record.
pub type RecordMap = HashMap<String, VerificationRecord>;

/// A persistent mapping from normalized wallet address to verification
/// record.
///
/// Failure semantics: read failures degrade to "no records found" rather
/// than propagating; write failures propagate to the caller. Callers are
/// responsible for normalizing identifiers before lookup; the store does
/// no normalization of its own.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the full mapping. A missing or unparsable backing file yields
    /// an empty mapping, never an error.
    async fn load(&self) -> RecordMap;

    /// Serialize and overwrite the full mapping.
    async fn save(&self, records: &RecordMap) -> Result<(), StoreError>;

    /// Look up a single record by normalized identifier.
    async fn get(&self, normalized_id: &str) -> Option<VerificationRecord>;

    /// Store a record under a normalized identifier, overwriting any prior
    /// record unconditionally.
    async fn put(&self, normalized_id: &str, record: VerificationRecord)
        -> Result<(), StoreError>;
}
