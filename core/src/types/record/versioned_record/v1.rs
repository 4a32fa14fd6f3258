use serde::{Deserialize, Serialize};

use super::RecordVariant;

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub content: String,
    pub created_at_ms: i64,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
    pub views: u64,
}

impl RecordVariant for Record {
    const VERSION: u8 = 1;
}
