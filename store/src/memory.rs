//! In-memory record store for tests.

use crate::records::{RecordMap, RecordStore};
use crate::StoreError;
use tokio::sync::Mutex;
use yam_types::VerificationRecord;

/// Record store backed by a mutex-guarded map. Same contract as the file
/// store, minus persistence.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<RecordMap>,
    /// When set, every write fails with this message (for testing the
    /// write-failure path in handlers).
    fail_writes: Option<String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            records: Mutex::new(RecordMap::new()),
            fail_writes: Some(reason.into()),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self) -> RecordMap {
        self.records.lock().await.clone()
    }

    async fn save(&self, records: &RecordMap) -> Result<(), StoreError> {
        if let Some(reason) = &self.fail_writes {
            return Err(StoreError::Backend(reason.clone()));
        }
        *self.records.lock().await = records.clone();
        Ok(())
    }

    async fn get(&self, normalized_id: &str) -> Option<VerificationRecord> {
        self.records.lock().await.get(normalized_id).cloned()
    }

    async fn put(
        &self,
        normalized_id: &str,
        record: VerificationRecord,
    ) -> Result<(), StoreError> {
        if let Some(reason) = &self.fail_writes {
            return Err(StoreError::Backend(reason.clone()));
        }
        self.records
            .lock()
            .await
            .insert(normalized_id.to_string(), record);
        Ok(())
    }
}
