//! Verification record storage.
//!
//! The store is a mapping from normalized wallet address to
//! [`VerificationRecord`](yam_types::VerificationRecord), read and written
//! as a whole on each access. Two backends implement the [`RecordStore`]
//! trait: the JSON-file store used in production and an in-memory store for
//! testing. The rest of the workspace depends only on the trait.

pub mod error;
pub mod file;
pub mod memory;
pub mod records;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryRecordStore;
pub use records::{RecordMap, RecordStore};
