//! Pacing gate for reasoning-backend calls
//!
//! The reasoning backend enforces a shared tokens-per-minute quota across
//! every call made with the same credential, so callers must space their
//! requests out. The gate tracks the last call time and makes each caller
//! wait out the remainder of the configured interval; holding the lock
//! across the sleep serializes concurrent callers onto the same schedule.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fixed-interval gate shared by all reasoning-backend call sites
#[derive(Debug)]
pub struct PacingGate {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl PacingGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the standard interval has elapsed since the previous call
    pub async fn wait(&self) {
        self.wait_for(self.interval).await;
    }

    /// Wait until at least `interval` has elapsed since the previous call
    pub async fn wait_for(&self, interval: Duration) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
