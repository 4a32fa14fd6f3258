//! Metadata types for persistent store state.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Maintenance metadata. Missing fields default to None.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceMetadata {
    #[serde(default)]
    pub last_sweep_at: Option<Timestamp>,
}
