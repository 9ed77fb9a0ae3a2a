//! JSON-file record store.
//!
//! The backing file holds the whole mapping as a single JSON object:
//! `{ [normalizedIdentifier]: VerificationRecord }`. No schema versioning;
//! a malformed file is treated as empty on the next read.

use crate::records::{RecordMap, RecordStore};
use crate::StoreError;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;
use yam_types::VerificationRecord;

/// File-backed record store.
///
/// Every read loads the full file and every write rewrites it. A
/// process-local mutex spans each load-modify-write so two concurrent
/// `put`s in this process cannot drop each other; writers in *other*
/// processes can still race (last writer wins), an accepted limitation at
/// expected low write volume.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Default backing file name, relative to the process working directory.
    pub const DEFAULT_FILE: &'static str = "verification-results.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> RecordMap {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            // Missing file is the normal first-run state.
            Err(_) => return RecordMap::new(),
        };
        match serde_json::from_str(&data) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), "unparsable record file, treating as empty: {e}");
                RecordMap::new()
            }
        }
    }

    async fn write_map(&self, records: &RecordMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| StoreError::Backend(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait::async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> RecordMap {
        self.read_map().await
    }

    async fn save(&self, records: &RecordMap) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_map(records).await
    }

    async fn get(&self, normalized_id: &str) -> Option<VerificationRecord> {
        self.read_map().await.get(normalized_id).cloned()
    }

    async fn put(
        &self,
        normalized_id: &str,
        record: VerificationRecord,
    ) -> Result<(), StoreError> {
        // Hold the lock across load-modify-write so concurrent puts in this
        // process both survive.
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_map().await;
        records.insert(normalized_id.to_string(), record);
        self.write_map(&records).await
    }
}
