mod app;
mod core;
mod sweep;

pub use app::{AppConfig, ConfigError, IdsConfig, MaintenanceConfig};
pub use self::core::Config;
pub use sweep::SweepConfig;
