//! Durable record store backed by redb.
//!
//! Tables:
//! - `pastes`: PasteId → versioned record bytes
//! - `expiry`: (expires_at, PasteId) → (), one entry per record with a TTL
//! - `metadata`: &str → JSON string
//!
//! redb runs at most one write transaction at a time, so every
//! read-modify-write done inside a single write transaction is atomic.

use crate::core::store::error::StoreError;
use crate::core::store::{Mutation, RecordStore};
use crate::types::metadata::MaintenanceMetadata;
use crate::types::record::versioned_record::VersionedRecord;
use crate::types::{Config, ExpiryKey, PasteId, PasteRecord, Timestamp};
use expiry_table::ExpiryTable;
use redb::{ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

mod expiry_table;

/// Main table: PasteId → VersionedRecord bytes
const PASTES_TABLE: TableDefinition<'static, PasteId, &'static [u8]> =
    TableDefinition::new("pastes");

/// Metadata table: &str → JSON string
const METADATA_TABLE: TableDefinition<'static, &'static str, &'static str> =
    TableDefinition::new("metadata");

/// Metadata key for maintenance tracking.
const METADATA_KEY_MAINTENANCE: &str = "maintenance";

/// Index of TTL deadlines, used by sweeps.
const EXPIRY: ExpiryTable = ExpiryTable::new("expiry");

pub struct RedbStore {
    db: redb::Database,
}

impl RedbStore {
    /// Creates or opens the database at `config.db_path()`.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.base_path)?;

        let db = redb::Database::create(config.db_path())?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PASTES_TABLE)?;
            let _ = write_txn.open_table(METADATA_TABLE)?;
            EXPIRY.init(&write_txn)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    #[cfg(test)]
    pub(crate) fn indexed_expiries(&self) -> Result<Vec<ExpiryKey>, StoreError> {
        let read_txn = self.db.begin_read()?;
        EXPIRY.all(&read_txn)
    }
}

impl RecordStore for RedbStore {
    fn get(&self, id: &PasteId) -> Result<Option<PasteRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PASTES_TABLE)?;

        table.get(id)?.map(|guard| decode(guard.value())).transpose()
    }

    fn set(&self, id: &PasteId, record: &PasteRecord) -> Result<(), StoreError> {
        let bytes = encode(record)?;
        let write_txn = self.db.begin_write()?;

        {
            let mut table = write_txn.open_table(PASTES_TABLE)?;

            let previous = table
                .insert(id, bytes.as_slice())?
                .map(|guard| decode(guard.value()))
                .transpose()?;

            Self::reindex(
                &write_txn,
                id,
                previous.as_ref().and_then(PasteRecord::expires_at),
                record.expires_at(),
            )?;
        }

        write_txn.commit()?;
        Ok(())
    }

    fn delete(&self, id: &PasteId) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;

        let removed = {
            let mut table = write_txn.open_table(PASTES_TABLE)?;

            let removed = table
                .remove(id)?
                .map(|guard| decode(guard.value()))
                .transpose()?;

            if let Some(record) = &removed {
                Self::reindex(&write_txn, id, record.expires_at(), None)?;
            }
            removed.is_some()
        };

        write_txn.commit()?;
        Ok(removed)
    }

    fn ping(&self) -> Result<(), StoreError> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(PASTES_TABLE)?;
        Ok(())
    }

    fn update<T, F>(&self, id: &PasteId, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(Option<PasteRecord>) -> (Mutation, T),
    {
        let write_txn = self.db.begin_write()?;
        let mut table = write_txn.open_table(PASTES_TABLE)?;

        let current = table
            .get(id)?
            .map(|guard| decode(guard.value()))
            .transpose()?;
        let old_expiry = current.as_ref().and_then(PasteRecord::expires_at);

        let (mutation, result) = f(current);

        match mutation {
            Mutation::Keep => {
                drop(table);
                write_txn.abort()?;
                return Ok(result);
            }
            Mutation::Put(record) => {
                table.insert(id, encode(&record)?.as_slice())?;
                Self::reindex(&write_txn, id, old_expiry, record.expires_at())?;
            }
            Mutation::Delete => {
                table.remove(id)?;
                Self::reindex(&write_txn, id, old_expiry, None)?;
            }
        }

        drop(table);
        write_txn.commit()?;
        Ok(result)
    }

    fn expired_ids(&self, now: Timestamp) -> Result<Vec<PasteId>, StoreError> {
        let read_txn = self.db.begin_read()?;
        EXPIRY.due(&read_txn, now)
    }

    fn last_sweep_at(&self) -> Result<Option<Timestamp>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(METADATA_TABLE)?;

        let Some(guard) = table.get(METADATA_KEY_MAINTENANCE)? else {
            return Ok(None);
        };
        let metadata: MaintenanceMetadata = serde_json::from_str(guard.value())?;
        Ok(metadata.last_sweep_at)
    }

    fn record_sweep(&self, now: Timestamp) -> Result<(), StoreError> {
        let json = serde_json::to_string(&MaintenanceMetadata {
            last_sweep_at: Some(now),
        })?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(METADATA_TABLE)?;
            table.insert(METADATA_KEY_MAINTENANCE, json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// Expiry index helpers.
impl RedbStore {
    /// Moves the index entry of `id` from `old` to `new` deadline.
    fn reindex(
        txn: &WriteTransaction,
        id: &PasteId,
        old: Option<Timestamp>,
        new: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        if old == new {
            return Ok(());
        }

        if let Some(expires_at) = old {
            EXPIRY.remove(
                txn,
                &ExpiryKey {
                    expires_at,
                    id: id.clone(),
                },
            )?;
        }

        if let Some(expires_at) = new {
            EXPIRY.insert(
                txn,
                &ExpiryKey {
                    expires_at,
                    id: id.clone(),
                },
            )?;
        }

        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<PasteRecord, StoreError> {
    let record = VersionedRecord::decode(bytes)?.into_latest();
    Ok(PasteRecord::from_latest_record(record))
}

fn encode(record: &PasteRecord) -> Result<Vec<u8>, StoreError> {
    VersionedRecord::V1(record.to_latest_record()).encode()
}
