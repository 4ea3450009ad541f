//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;
use std::time::Duration;

use crate::chunker::ChunkerOptions;
use crate::error::Result;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl CopyConfig {
    /// Pause between chunks as a [`Duration`].
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Lag threshold for the replica-lag strategy as a [`Duration`].
    pub fn max_replica_lag(&self) -> Duration {
        Duration::from_secs(self.max_replica_lag_secs)
    }
}

impl MigrationConfig {
    /// Engine options derived from this configuration.
    pub fn chunker_options(&self, copy: &CopyConfig) -> ChunkerOptions {
        ChunkerOptions {
            lock_wait_retries: copy.lock_wait_retries,
            retry_wait: Duration::from_secs(copy.retry_wait_secs),
            start: self.start,
            limit: self.limit,
        }
    }
}
