//! Inter-request pacing
//!
//! Uses the governor crate to enforce the configured pause between
//! consecutive outbound requests. One permit per period, burst of one:
//! the first request proceeds immediately, every later request waits
//! until the pause has elapsed since the previous one.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::sync::Arc;
use std::time::Duration;

/// Enforces a fixed pause between consecutive requests
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RequestPacer {
    /// Create a pacer for the given pause. Returns `None` for a zero
    /// pause, which disables pacing entirely.
    pub fn new(pause: Duration) -> Option<Self> {
        let quota = Quota::with_period(pause)?;
        Some(Self {
            limiter: Arc::new(Governor::direct(quota)),
        })
    }

    /// Wait until the pause since the previous request has elapsed
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Check whether a request could proceed right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer").finish()
    }
}

#[cfg(test)]
mod pacer_tests {
    use super::*;

    #[test]
    fn test_zero_pause_disables_pacing() {
        assert!(RequestPacer::new(Duration::ZERO).is_none());
    }

    #[test]
    fn test_single_permit_per_period() {
        let pacer = RequestPacer::new(Duration::from_secs(60)).unwrap();
        assert!(pacer.try_acquire());
        // Second permit is not available until the pause elapses
        assert!(!pacer.try_acquire());
    }

    #[tokio::test]
    async fn test_wait_completes_for_first_request() {
        let pacer = RequestPacer::new(Duration::from_millis(10)).unwrap();
        pacer.wait().await;
    }
}
