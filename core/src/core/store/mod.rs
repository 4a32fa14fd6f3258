//! The record store contract consumed by the lifecycle manager.
//!
//! Stores interpret nothing: TTL and view limits are the caller's business.
//! The only extra the contract asks for is [`RecordStore::update`], a
//! single-record read-modify-write that no other write may interleave with.

use crate::types::{PasteId, PasteRecord, Timestamp};
use error::StoreError;

pub(crate) mod memory_store;
pub(crate) mod redb_store;

pub use memory_store::MemoryStore;
pub use redb_store::RedbStore;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum StoreError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Corrupted record: {0}")]
        Corrupted(String),

        #[error("Metadata error: {0}")]
        Metadata(#[from] serde_json::Error),
    }
}

/// What [`RecordStore::update`] should do with the record it read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Keep,
    Put(PasteRecord),
    Delete,
}

pub trait RecordStore: Send + Sync {
    /// Reads a record. No side effects.
    fn get(&self, id: &PasteId) -> Result<Option<PasteRecord>, StoreError>;

    /// Unconditional upsert, last writer wins.
    fn set(&self, id: &PasteId, record: &PasteRecord) -> Result<(), StoreError>;

    /// Removes a record. Returns whether it was present; absent keys are not an error.
    fn delete(&self, id: &PasteId) -> Result<bool, StoreError>;

    /// Liveness probe for health checks.
    fn ping(&self) -> Result<(), StoreError>;

    /// Atomically reads the record for `id`, lets `f` decide on a mutation,
    /// and applies it. No other write to the store is observed between the
    /// read and the write.
    fn update<T, F>(&self, id: &PasteId, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(Option<PasteRecord>) -> (Mutation, T);

    /// Ids whose TTL deadline is at or before `now`, earliest deadline first.
    fn expired_ids(&self, now: Timestamp) -> Result<Vec<PasteId>, StoreError>;

    fn last_sweep_at(&self) -> Result<Option<Timestamp>, StoreError>;

    fn record_sweep(&self, now: Timestamp) -> Result<(), StoreError>;
}
