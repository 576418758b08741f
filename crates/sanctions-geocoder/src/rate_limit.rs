//! Process-wide request spacing for the geocoder.
//!
//! A [`RateLimiter`] admits one call at a time. Each admitted call starts no
//! earlier than `min_interval` after the previous call finished. Clones
//! share state, so one limiter governs every client built from it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializing, spacing rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    last_finished: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    /// Create a limiter with the given minimum spacing.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_finished: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Configured spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Run `f` once admitted. The slot is held until `f` completes.
    pub async fn run<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last = self.last_finished.lock().await;
        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.min_interval).await;
        }
        let out = f().await;
        *last = Some(Instant::now());
        out
    }
}
