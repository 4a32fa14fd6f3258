//! The persisted paste record.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

pub(crate) mod versioned_record;

use versioned_record::latest_record;

/// A stored paste. The id is the store key and is not part of the value.
///
/// The JSON form is `{content, createdAt, ttlSeconds, maxViews, views}` with
/// explicit `null` for absent limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteRecord {
    pub content: String,
    pub created_at: Timestamp,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
    pub views: u64,
}

impl PasteRecord {
    pub fn new(
        content: String,
        created_at: Timestamp,
        ttl_seconds: Option<u64>,
        max_views: Option<u64>,
    ) -> Self {
        Self {
            content,
            created_at,
            ttl_seconds,
            max_views,
            views: 0,
        }
    }

    /// Instant at which the record stops being readable, if it has a TTL.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.ttl_seconds
            .map(|ttl| self.created_at.saturating_add_secs(ttl))
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }

    /// No further successful views are possible.
    pub fn is_exhausted(&self) -> bool {
        self.max_views.is_some_and(|max| self.views >= max)
    }

    pub fn remaining_views(&self) -> Option<u64> {
        self.max_views.map(|max| max.saturating_sub(self.views))
    }

    pub(crate) fn from_latest_record(record: latest_record::Record) -> Self {
        Self {
            content: record.content,
            created_at: Timestamp::from_millis(record.created_at_ms),
            ttl_seconds: record.ttl_seconds,
            max_views: record.max_views,
            views: record.views,
        }
    }

    pub(crate) fn to_latest_record(&self) -> latest_record::Record {
        latest_record::Record {
            content: self.content.clone(),
            created_at_ms: self.created_at.as_millis(),
            ttl_seconds: self.ttl_seconds,
            max_views: self.max_views,
            views: self.views,
        }
    }
}
