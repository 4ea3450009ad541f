//! Fixed-interval pacing.

use std::time::Duration;

use async_trait::async_trait;

use super::Throttler;

/// Default chunk stride in ids.
pub const DEFAULT_STRIDE: u64 = 40_000;

/// Default pause after a chunk that changed rows.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// Constant stride, constant pause.
#[derive(Debug, Clone)]
pub struct TimeThrottler {
    stride: u64,
    pause: Duration,
}

impl TimeThrottler {
    pub fn new(stride: u64, pause: Duration) -> Self {
        Self {
            stride: stride.max(1),
            pause,
        }
    }
}

impl Default for TimeThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_STRIDE, DEFAULT_PAUSE)
    }
}

#[async_trait]
impl Throttler for TimeThrottler {
    fn stride(&self) -> u64 {
        self.stride
    }

    async fn run(&mut self) {
        tokio::time::sleep(self.pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_is_never_zero() {
        assert_eq!(TimeThrottler::new(0, Duration::ZERO).stride(), 1);
    }

    #[tokio::test]
    async fn test_run_with_zero_pause_returns() {
        let mut throttler = TimeThrottler::new(10, Duration::ZERO);
        throttler.run().await;
        assert_eq!(throttler.stride(), 10);
    }
}
