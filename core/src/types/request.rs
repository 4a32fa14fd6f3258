//! Inputs and outputs of the lifecycle operations as seen by outer callers.

use crate::core::error::PasteError;
use crate::types::PasteRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Largest accepted TTL. Keeps every deadline representable as a calendar date.
pub const MAX_TTL_SECONDS: u64 = 8_000_000_000_000;

/// A create request as received from a caller.
///
/// Fields stay loosely typed so that strings, fractions and negative numbers
/// are rejected with the matching reason instead of failing to deserialize.
/// Missing and `null` fields are both treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteRequest {
    #[serde(default)]
    pub content: JsonValue,
    #[serde(default)]
    pub ttl_seconds: JsonValue,
    #[serde(default)]
    pub max_views: JsonValue,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidPaste {
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
}

impl PasteRequest {
    pub fn new(
        content: impl Into<String>,
        ttl_seconds: Option<u64>,
        max_views: Option<u64>,
    ) -> Self {
        Self {
            content: JsonValue::String(content.into()),
            ttl_seconds: ttl_seconds.map_or(JsonValue::Null, JsonValue::from),
            max_views: max_views.map_or(JsonValue::Null, JsonValue::from),
        }
    }

    /// Checks content, then TTL, then view limit, stopping at the first failure.
    pub(crate) fn validate(self) -> Result<ValidPaste, PasteError> {
        let content = match self.content {
            JsonValue::String(content) if !content.trim().is_empty() => content,
            _ => return Err(PasteError::InvalidContent),
        };

        let ttl_seconds = positive_integer(&self.ttl_seconds, PasteError::InvalidTtl)?;
        if ttl_seconds.is_some_and(|ttl| ttl > MAX_TTL_SECONDS) {
            return Err(PasteError::InvalidTtl);
        }

        let max_views = positive_integer(&self.max_views, PasteError::InvalidMaxViews)?;

        Ok(ValidPaste {
            content,
            ttl_seconds,
            max_views,
        })
    }
}

/// `null` is absent; integers >= 1 (including `60.0`) are accepted; anything
/// else yields `invalid`. Whole numbers beyond `u64::MAX` (`1e20`) saturate.
fn positive_integer(value: &JsonValue, invalid: PasteError) -> Result<Option<u64>, PasteError> {
    let number = match value {
        JsonValue::Null => return Ok(None),
        JsonValue::Number(number) => number,
        _ => return Err(invalid),
    };

    if let Some(n) = number.as_u64() {
        return if n >= 1 { Ok(Some(n)) } else { Err(invalid) };
    }
    if number.is_i64() {
        return Err(invalid);
    }

    match number.as_f64() {
        // `as` saturates at u64::MAX.
        Some(f) if f.is_finite() && f.fract() == 0.0 && f >= 1.0 => Ok(Some(f as u64)),
        _ => Err(invalid),
    }
}

/// Result of a successful access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasteView {
    pub content: String,
    /// `None` when the paste has no view limit.
    pub remaining_views: Option<u64>,
    /// ISO 8601 deadline, `None` when the paste has no TTL.
    pub expires_at: Option<String>,
}

impl PasteView {
    pub(crate) fn from_record(record: &PasteRecord) -> Self {
        Self {
            content: record.content.clone(),
            remaining_views: record.remaining_views(),
            expires_at: record.expires_at().map(|at| at.to_iso8601()),
        }
    }
}
