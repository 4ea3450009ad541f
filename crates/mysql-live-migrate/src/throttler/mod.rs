//! Pacing strategies applied between copy chunks.
//!
//! A throttler answers two questions for the engine: how many ids the next
//! chunk should advance by, and how long to pause after a chunk that changed
//! rows. Strategies are interchangeable; the engine never depends on which
//! one is behind the trait.

mod replica_lag;
mod time;

pub use replica_lag::{LagProbe, ReplicaLagThrottler};
pub use time::TimeThrottler;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{MigrateError, Result};

/// Backpressure strategy consulted by the copy engine between chunks.
#[async_trait]
pub trait Throttler: Send {
    /// Number of ids the next chunk should attempt to advance by (>= 1).
    ///
    /// This is a requested id stride, not a guaranteed row count: ids may be
    /// sparse.
    fn stride(&self) -> u64;

    /// Pacing hook, invoked after a chunk that changed at least one row.
    /// May block for a computed delay or be a no-op.
    async fn run(&mut self);
}

/// Selects a throttle strategy at engine construction time: either a
/// registered name or a pre-built instance.
pub enum ThrottlerSpec {
    /// Look up a strategy in the registry by name.
    Name(String),
    /// Use this instance directly.
    Instance(Box<dyn Throttler>),
}

/// Inputs shared by registry-built strategies.
pub struct ThrottlerConfig {
    /// Requested chunk stride in ids.
    pub stride: u64,
    /// Base pause between chunks.
    pub pause: Duration,
    /// Replication delay above which the dynamic strategy backs off.
    pub max_lag: Duration,
    /// Replication delay signal, required by the `replica-lag` strategy.
    pub lag_probe: Option<Arc<dyn LagProbe>>,
}

impl Default for ThrottlerConfig {
    fn default() -> Self {
        Self {
            stride: time::DEFAULT_STRIDE,
            pause: time::DEFAULT_PAUSE,
            max_lag: replica_lag::DEFAULT_MAX_LAG,
            lag_probe: None,
        }
    }
}

/// Build a throttle strategy from a selector.
///
/// Registered names are `"time"` and `"replica-lag"`; anything else is a
/// configuration error.
pub fn create_throttler(spec: ThrottlerSpec, config: ThrottlerConfig) -> Result<Box<dyn Throttler>> {
    match spec {
        ThrottlerSpec::Instance(throttler) => Ok(throttler),
        ThrottlerSpec::Name(name) => match name.as_str() {
            "time" => Ok(Box::new(TimeThrottler::new(config.stride, config.pause))),
            "replica-lag" => {
                let probe = config.lag_probe.ok_or_else(|| {
                    MigrateError::Config(
                        "throttler 'replica-lag' requires a replication lag probe".into(),
                    )
                })?;
                Ok(Box::new(ReplicaLagThrottler::new(
                    probe,
                    config.stride,
                    config.pause,
                    config.max_lag,
                )))
            }
            other => Err(MigrateError::Config(format!(
                "unknown throttler '{}' (expected 'time' or 'replica-lag')",
                other
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_by_name() {
        let throttler =
            create_throttler(ThrottlerSpec::Name("time".into()), ThrottlerConfig::default())
                .unwrap();
        assert_eq!(throttler.stride(), time::DEFAULT_STRIDE);
    }

    #[test]
    fn test_create_from_instance() {
        let instance = Box::new(TimeThrottler::new(7, Duration::ZERO));
        let throttler = create_throttler(
            ThrottlerSpec::Instance(instance),
            ThrottlerConfig::default(),
        )
        .unwrap();
        assert_eq!(throttler.stride(), 7);
    }

    #[test]
    fn test_unknown_name_is_config_error() {
        let err = create_throttler(
            ThrottlerSpec::Name("tempo".into()),
            ThrottlerConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn test_replica_lag_requires_probe() {
        let err = create_throttler(
            ThrottlerSpec::Name("replica-lag".into()),
            ThrottlerConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MigrateError::Config(_)));
    }
}
