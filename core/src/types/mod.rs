pub(crate) mod config;
pub use config::{AppConfig, Config, ConfigError, IdsConfig, MaintenanceConfig, SweepConfig};

pub(crate) mod paste_id;
pub use paste_id::{DEFAULT_ID_LENGTH, MAX_ID_LENGTH, PasteId, PasteIdError};

pub(crate) mod timestamp;
pub use timestamp::Timestamp;

pub(crate) mod record;
pub use record::PasteRecord;

pub(crate) mod request;
pub use request::{MAX_TTL_SECONDS, PasteRequest, PasteView};

pub(crate) mod expiry_key;
pub use expiry_key::ExpiryKey;

pub(crate) mod metadata;
