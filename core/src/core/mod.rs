//! Paste lifecycle manager: creation, conditional access and expiry.

use crate::core::store::error::StoreError;
use crate::core::store::{Mutation, RecordStore, RedbStore};
use crate::types::request::ValidPaste;
use crate::types::{Config, PasteId, PasteRecord, PasteRequest, PasteView, Timestamp};
use error::PasteError;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod store;

pub mod error {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum PasteError {
        #[error("content must be a non-empty string")]
        InvalidContent,

        #[error("ttlSeconds must be a positive integer no greater than 8000000000000")]
        InvalidTtl,

        #[error("maxViews must be a positive integer")]
        InvalidMaxViews,

        /// Missing, expired and exhausted pastes all look the same to callers.
        #[error("paste not found")]
        NotFound,

        #[error("store unavailable: {0}")]
        StoreUnavailable(#[from] StoreError),
    }
}

/// Why an access returned `NotFound`. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotFoundReason {
    Missing,
    Expired,
    Exhausted,
}

pub struct PasteCore<S = RedbStore> {
    store: S,
    id_length: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Expired pastes deleted by this sweep.
    pub removed: Vec<PasteId>,
}

impl PasteCore<RedbStore> {
    /// Opens the redb-backed store described by `config`.
    pub fn open(config: Config) -> Result<Self, PasteError> {
        let store = RedbStore::open(&config)?;
        Ok(Self::new(store, config.id_length))
    }
}

impl<S: RecordStore> PasteCore<S> {
    pub fn new(store: S, id_length: usize) -> Self {
        Self { store, id_length }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Health probe, forwarded to the store.
    pub fn ping(&self) -> Result<(), PasteError> {
        Ok(self.store.ping()?)
    }
}

/// Lifecycle operations.
impl<S: RecordStore> PasteCore<S> {
    /// Validates and stores a new paste, returning its id.
    ///
    /// Nothing is written unless validation passes.
    pub fn create(&self, request: PasteRequest, now: Timestamp) -> Result<PasteId, PasteError> {
        let ValidPaste {
            content,
            ttl_seconds,
            max_views,
        } = request.validate()?;

        let id = PasteId::generate(self.id_length);
        let record = PasteRecord::new(content, now, ttl_seconds, max_views);

        self.store
            .set(&id, &record)
            .inspect_err(|e| warn!(%id, error = %e, "failed to store paste"))?;

        debug!(%id, ?ttl_seconds, ?max_views, "created paste");
        Ok(id)
    }

    /// Consumes one view of a paste.
    ///
    /// The TTL check, view-limit check and view increment run as one atomic
    /// store update, so concurrent readers can never be served more than
    /// `max_views` times in total. An expired paste is deleted; an exhausted
    /// one is left in place.
    ///
    /// Lookups of missing or exhausted pastes only read from the store.
    pub fn access(&self, id: &str, now: Timestamp) -> Result<PasteView, PasteError> {
        let Ok(id) = PasteId::try_from(id) else {
            debug!(reason = ?NotFoundReason::Missing, "rejected malformed paste id");
            return Err(PasteError::NotFound);
        };

        // Missing and exhausted pastes are settled by a read; only a paste that
        // will actually change takes the store's write path.
        let settled = match self
            .store
            .get(&id)
            .inspect_err(|e| warn!(%id, error = %e, "failed to access paste"))?
        {
            None => Some(NotFoundReason::Missing),
            Some(record) if record.is_exhausted() && !record.is_expired(now) => {
                Some(NotFoundReason::Exhausted)
            }
            Some(_) => None,
        };
        if let Some(reason) = settled {
            debug!(%id, ?reason, "paste not found");
            return Err(PasteError::NotFound);
        }

        // The record may have changed since the read, so every rule is checked
        // again inside the update.
        let outcome = self
            .store
            .update(&id, |record| match record {
                None => (Mutation::Keep, Err(NotFoundReason::Missing)),
                Some(record) if record.is_expired(now) => {
                    (Mutation::Delete, Err(NotFoundReason::Expired))
                }
                Some(record) if record.is_exhausted() => {
                    (Mutation::Keep, Err(NotFoundReason::Exhausted))
                }
                Some(mut record) => {
                    record.views += 1;
                    let view = PasteView::from_record(&record);
                    (Mutation::Put(record), Ok(view))
                }
            })
            .inspect_err(|e| warn!(%id, error = %e, "failed to access paste"))?;

        match outcome {
            Ok(view) => {
                debug!(%id, remaining_views = ?view.remaining_views, "served paste");
                Ok(view)
            }
            Err(reason) => {
                debug!(%id, ?reason, "paste not found");
                Err(PasteError::NotFound)
            }
        }
    }

    /// Reads the stored record without consuming a view or applying any
    /// lifecycle rule. For operators and diagnostics.
    pub fn peek(&self, id: &str) -> Result<Option<PasteRecord>, PasteError> {
        let Ok(id) = PasteId::try_from(id) else {
            return Ok(None);
        };
        Ok(self.store.get(&id)?)
    }
}

/// Maintenance operations.
impl<S: RecordStore> PasteCore<S> {
    /// Deletes every paste whose TTL has elapsed at `now`.
    ///
    /// Exhausted pastes are not touched. Each candidate is re-checked inside
    /// an atomic update, so a sweep racing with access never deletes a live
    /// record.
    pub fn sweep(&self, now: Timestamp) -> Result<SweepOutcome, PasteError> {
        let mut outcome = SweepOutcome::default();

        for id in self.store.expired_ids(now)? {
            let deleted = self.store.update(&id, |record| match record {
                Some(record) if record.is_expired(now) => (Mutation::Delete, true),
                _ => (Mutation::Keep, false),
            })?;

            if deleted {
                outcome.removed.push(id);
            }
        }

        self.store.record_sweep(now)?;

        if !outcome.removed.is_empty() {
            info!(removed = outcome.removed.len(), "swept expired pastes");
        }
        Ok(outcome)
    }

    /// Returns true if a sweep should run (never run or interval elapsed).
    pub fn should_sweep(&self, now: Timestamp, interval: Duration) -> Result<bool, PasteError> {
        let Some(last) = self.store.last_sweep_at()? else {
            return Ok(true);
        };

        let elapsed = now.millis_since(last);
        let interval = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);

        // A clock that went backwards counts as due.
        Ok(elapsed < 0 || elapsed >= interval)
    }

    /// Runs `sweep` if it is due, see [`Self::should_sweep`].
    pub fn maintenance(
        &self,
        now: Timestamp,
        interval: Duration,
    ) -> Result<Option<SweepOutcome>, PasteError> {
        if !self.should_sweep(now, interval)? {
            return Ok(None);
        }
        self.sweep(now).map(Some)
    }
}

#[cfg(test)]
mod tests;
