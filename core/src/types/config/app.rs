use crate::types::{DEFAULT_ID_LENGTH, MAX_ID_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shortest id length accepted from configuration.
pub const MIN_CONFIGURED_ID_LENGTH: usize = 6;

/// Operator-facing configuration, persisted as config.toml.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub ids: IdsConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

impl AppConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(MIN_CONFIGURED_ID_LENGTH..=MAX_ID_LENGTH).contains(&self.ids.length) {
            errors.push(format!(
                "ids.length must be between {MIN_CONFIGURED_ID_LENGTH} and {MAX_ID_LENGTH}"
            ));
        }

        if self.maintenance.sweep_interval_secs == 0 {
            errors.push("maintenance.sweep_interval_secs must be at least 1".to_string());
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = Self::default();
        Self {
            ids: IdsConfig {
                length: if (MIN_CONFIGURED_ID_LENGTH..=MAX_ID_LENGTH).contains(&self.ids.length) {
                    self.ids.length
                } else {
                    defaults.ids.length
                },
            },
            maintenance: MaintenanceConfig {
                sweep_interval_secs: if self.maintenance.sweep_interval_secs == 0 {
                    defaults.maintenance.sweep_interval_secs
                } else {
                    self.maintenance.sweep_interval_secs
                },
            },
        }
    }
}

/// Identifier generation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsConfig {
    #[serde(default = "default_id_length")]
    pub length: usize,
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            length: default_id_length(),
        }
    }
}

fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}

/// Expired-record sweep settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
