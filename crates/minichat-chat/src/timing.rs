//! Injectable delay primitive for simulated reply latency.

use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Suspends the current task for a duration.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sample a latency uniformly from `range` (milliseconds, end exclusive).
///
/// An empty range yields its start.
pub fn sample_latency<R: Rng>(range: Range<u64>, rng: &mut R) -> Duration {
    if range.is_empty() {
        return Duration::from_millis(range.start);
    }
    Duration::from_millis(rng.random_range(range))
}
