//! In-process record store, for tests and embedding.
//!
//! Every record sits behind its own lock. The map lock is only held long
//! enough to find a record's slot, or to insert and remove slots, so `update`
//! on one id never waits for an `update` on another.
//!
//! Lock order is map, then slot. `update` never takes the map lock while it
//! holds a slot lock.

use crate::core::store::error::StoreError;
use crate::core::store::{Mutation, RecordStore};
use crate::types::{PasteId, PasteRecord, Timestamp};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A slot emptied by a delete is unlinked from the map right after. Until then
/// it reads as absent.
type Slot = Arc<Mutex<Option<PasteRecord>>>;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<PasteId, Slot>>,
    last_sweep_at: Mutex<Option<Timestamp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &PasteId) -> Option<Slot> {
        self.records.read().get(id).cloned()
    }

    /// Drops `slot` from the map unless a `set` refilled or replaced it.
    fn unlink(&self, id: &PasteId, slot: &Slot) {
        let mut records = self.records.write();
        let still_empty = records
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.lock().is_none());
        if still_empty {
            records.remove(id);
        }
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, id: &PasteId) -> Result<Option<PasteRecord>, StoreError> {
        Ok(self.slot(id).and_then(|slot| slot.lock().clone()))
    }

    fn set(&self, id: &PasteId, record: &PasteRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        match records.get(id) {
            Some(slot) => *slot.lock() = Some(record.clone()),
            None => {
                records.insert(id.clone(), Arc::new(Mutex::new(Some(record.clone()))));
            }
        }
        Ok(())
    }

    fn delete(&self, id: &PasteId) -> Result<bool, StoreError> {
        let Some(slot) = self.records.write().remove(id) else {
            return Ok(false);
        };
        Ok(slot.lock().take().is_some())
    }

    fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn update<T, F>(&self, id: &PasteId, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(Option<PasteRecord>) -> (Mutation, T),
    {
        if let Some(slot) = self.slot(id) {
            let mut current = slot.lock();
            if current.is_some() {
                let (mutation, result) = f(current.clone());
                match mutation {
                    Mutation::Keep => {}
                    Mutation::Put(record) => *current = Some(record),
                    Mutation::Delete => {
                        *current = None;
                        drop(current);
                        self.unlink(id, &slot);
                    }
                }
                return Ok(result);
            }
        }

        // Absent: hold the map lock so a concurrent `set` cannot slip in
        // between the decision and the insert.
        let mut records = self.records.write();
        if let Some(slot) = records.get(id).cloned() {
            // Another `update` may still hold this slot; it releases the slot
            // before asking for the map lock, so waiting here cannot deadlock.
            let mut current = slot.lock();
            let (mutation, result) = f(current.clone());
            match mutation {
                Mutation::Keep => {}
                Mutation::Put(record) => *current = Some(record),
                Mutation::Delete => {
                    *current = None;
                    drop(current);
                    records.remove(id);
                }
            }
            return Ok(result);
        }

        let (mutation, result) = f(None);
        if let Mutation::Put(record) = mutation {
            records.insert(id.clone(), Arc::new(Mutex::new(Some(record))));
        }
        Ok(result)
    }

    fn expired_ids(&self, now: Timestamp) -> Result<Vec<PasteId>, StoreError> {
        let slots: Vec<(PasteId, Slot)> = self
            .records
            .read()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();

        let mut due: Vec<(Timestamp, PasteId)> = slots
            .into_iter()
            .filter_map(|(id, slot)| {
                let expires_at = slot.lock().as_ref()?.expires_at()?;
                (expires_at <= now).then_some((expires_at, id))
            })
            .collect();
        due.sort();

        Ok(due.into_iter().map(|(_, id)| id).collect())
    }

    fn last_sweep_at(&self) -> Result<Option<Timestamp>, StoreError> {
        Ok(*self.last_sweep_at.lock())
    }

    fn record_sweep(&self, now: Timestamp) -> Result<(), StoreError> {
        *self.last_sweep_at.lock() = Some(now);
        Ok(())
    }
}
