use super::MaintenanceConfig;
use std::time::Duration;

/// Interval configuration passed to maintenance operations.
#[derive(Clone, Copy, Debug)]
pub struct SweepConfig {
    pub interval: Duration,
}

impl From<&MaintenanceConfig> for SweepConfig {
    fn from(config: &MaintenanceConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.sweep_interval_secs),
        }
    }
}
