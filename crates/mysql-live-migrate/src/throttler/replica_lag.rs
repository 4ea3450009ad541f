//! Replication-lag driven pacing.
//!
//! Backs off when downstream replicas fall behind: the stride shrinks
//! multiplicatively and the pause stretches with the observed delay. When
//! the lag clears, the stride grows back toward its configured value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

use super::Throttler;

/// Replication delay above which the throttler starts backing off.
pub const DEFAULT_MAX_LAG: Duration = Duration::from_secs(10);

/// Stride floor while backing off.
const MIN_STRIDE: u64 = 1_000;

/// Cap on the lag-proportional share of the pause.
const MAX_LAG_PAUSE: Duration = Duration::from_secs(5);

/// Source of the replication delay signal.
///
/// Implemented by [`MysqlExecutor`](crate::db::MysqlExecutor) via
/// `SHOW REPLICA STATUS`; tests inject scripted probes.
#[async_trait]
pub trait LagProbe: Send + Sync {
    /// Current replication delay, or `None` when no replica is reporting.
    async fn replication_lag(&self) -> Result<Option<Duration>>;
}

/// Dynamic strategy: stride and pause adapt to measured replication delay.
pub struct ReplicaLagThrottler {
    probe: Arc<dyn LagProbe>,
    initial_stride: u64,
    stride: u64,
    pause: Duration,
    max_lag: Duration,
}

impl ReplicaLagThrottler {
    pub fn new(probe: Arc<dyn LagProbe>, stride: u64, pause: Duration, max_lag: Duration) -> Self {
        let stride = stride.max(1);
        Self {
            probe,
            initial_stride: stride,
            stride,
            pause,
            max_lag,
        }
    }
}

#[async_trait]
impl Throttler for ReplicaLagThrottler {
    fn stride(&self) -> u64 {
        self.stride
    }

    async fn run(&mut self) {
        match self.probe.replication_lag().await {
            Ok(Some(lag)) if lag > self.max_lag => {
                self.stride = (self.stride / 2).max(MIN_STRIDE).min(self.initial_stride);
                let pause = self.pause + lag.min(MAX_LAG_PAUSE);
                warn!(
                    "replication lag {:?} exceeds {:?}: stride reduced to {}, pausing {:?}",
                    lag, self.max_lag, self.stride, pause
                );
                tokio::time::sleep(pause).await;
            }
            Ok(_) => {
                if self.stride < self.initial_stride {
                    self.stride = (self.stride * 2).min(self.initial_stride);
                    debug!("replication caught up, stride restored to {}", self.stride);
                }
                tokio::time::sleep(self.pause).await;
            }
            Err(e) => {
                // A failing probe must not abort the copy; fall back to the
                // base pause until the signal returns.
                warn!("replication lag probe failed: {}", e);
                tokio::time::sleep(self.pause).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::MigrateError;

    /// Probe that replays a scripted sequence of readings.
    struct ScriptedProbe {
        readings: Mutex<Vec<Result<Option<Duration>>>>,
    }

    impl ScriptedProbe {
        fn new(readings: Vec<Result<Option<Duration>>>) -> Arc<Self> {
            Arc::new(Self {
                readings: Mutex::new(readings),
            })
        }
    }

    #[async_trait]
    impl LagProbe for ScriptedProbe {
        async fn replication_lag(&self) -> Result<Option<Duration>> {
            self.readings.lock().unwrap().remove(0)
        }
    }

    fn throttler(probe: Arc<dyn LagProbe>, stride: u64) -> ReplicaLagThrottler {
        ReplicaLagThrottler::new(probe, stride, Duration::ZERO, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_stride_halves_while_lagging() {
        let probe = ScriptedProbe::new(vec![
            Ok(Some(Duration::from_secs(30))),
            Ok(Some(Duration::from_secs(30))),
        ]);
        let mut t = throttler(probe, 40_000);

        t.run().await;
        assert_eq!(t.stride(), 20_000);
        t.run().await;
        assert_eq!(t.stride(), 10_000);
    }

    #[tokio::test]
    async fn test_stride_never_drops_below_floor() {
        let probe = ScriptedProbe::new(vec![Ok(Some(Duration::from_secs(30)))]);
        let mut t = throttler(probe, 1_500);

        t.run().await;
        assert_eq!(t.stride(), MIN_STRIDE);
    }

    #[tokio::test]
    async fn test_stride_recovers_when_lag_clears() {
        let probe = ScriptedProbe::new(vec![
            Ok(Some(Duration::from_secs(30))),
            Ok(Some(Duration::from_secs(30))),
            Ok(Some(Duration::from_secs(1))),
            Ok(None),
            Ok(None),
        ]);
        let mut t = throttler(probe, 40_000);

        t.run().await;
        t.run().await;
        assert_eq!(t.stride(), 10_000);

        t.run().await;
        assert_eq!(t.stride(), 20_000);
        t.run().await;
        assert_eq!(t.stride(), 40_000);
        // never overshoots the configured stride
        t.run().await;
        assert_eq!(t.stride(), 40_000);
    }

    #[tokio::test]
    async fn test_probe_failure_keeps_stride() {
        let probe = ScriptedProbe::new(vec![Err(MigrateError::Config("probe down".into()))]);
        let mut t = throttler(probe, 40_000);

        t.run().await;
        assert_eq!(t.stride(), 40_000);
    }
}
