use crate::core::store::error::StoreError;
use crate::types::{ExpiryKey, PasteId, Timestamp};
use redb::{ReadTransaction, TableDefinition, WriteTransaction};

/// Stores `ExpiryKey { expires_at, id }` entries so that due records can be
/// found with a range scan instead of reading every record.
pub struct ExpiryTable {
    definition: TableDefinition<'static, ExpiryKey, ()>,
}

impl ExpiryTable {
    pub const fn new(name: &'static str) -> Self {
        Self {
            definition: TableDefinition::new(name),
        }
    }

    pub fn init(&self, txn: &WriteTransaction) -> Result<(), StoreError> {
        txn.open_table(self.definition)?;
        Ok(())
    }

    pub fn insert(&self, txn: &WriteTransaction, key: &ExpiryKey) -> Result<(), StoreError> {
        let mut table = txn.open_table(self.definition)?;
        table.insert(key, &())?;
        Ok(())
    }

    /// Returns `true` if the entry was present.
    pub fn remove(&self, txn: &WriteTransaction, key: &ExpiryKey) -> Result<bool, StoreError> {
        let mut table = txn.open_table(self.definition)?;
        Ok(table.remove(key)?.is_some())
    }

    /// Returns ids with `expires_at <= now`, earliest first.
    pub fn due(&self, txn: &ReadTransaction, now: Timestamp) -> Result<Vec<PasteId>, StoreError> {
        let table = txn.open_table(self.definition)?;

        table
            .range(
                ..ExpiryKey {
                    expires_at: now.saturating_add_millis(1),
                    // SAFETY: This key is only used as a range bound, it is never stored.
                    // The empty id sorts before every real id with the same deadline.
                    id: unsafe { PasteId::new_unchecked(String::new()) },
                },
            )?
            .map(|entry| {
                let (key_guard, _) = entry?;
                Ok(key_guard.value().id)
            })
            .collect()
    }

    #[cfg(test)]
    pub fn all(&self, txn: &ReadTransaction) -> Result<Vec<ExpiryKey>, StoreError> {
        use redb::ReadableTable;

        let table = txn.open_table(self.definition)?;
        let mut keys = Vec::new();

        for entry in table.iter()? {
            let (key_guard, _) = entry?;
            keys.push(key_guard.value());
        }

        Ok(keys)
    }
}
