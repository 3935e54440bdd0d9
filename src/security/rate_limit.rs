//! Fixed-window rate limiting per client identifier.
//!
//! # Responsibilities
//! - Count requests per client within a fixed window
//! - Reject over-quota requests with an exact retry-after hint
//! - Sweep stale buckets periodically so memory stays bounded
//!
//! # Design Decisions
//! - Reset is lazy: a bucket whose window has passed is replaced on next
//!   access, so correctness never depends on the sweeper
//! - The runtime toggle keeps existing counters; re-enabling resumes the
//!   windows already in flight

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;

use crate::errors::{GatewayError, GatewayResult};

/// Per-client request counter for the current window.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    /// Epoch milliseconds at which this window ends.
    reset_at: u64,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Fixed-window rate limiter.
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    max_requests: u32,
    window_ms: u64,
    enabled: AtomicBool,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window_ms` per client.
    pub fn new(max_requests: u32, window_ms: u64, enabled: bool) -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests,
            window_ms,
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Record one request for `client` and admit or reject it.
    ///
    /// Rejection carries the remaining time to window reset, rounded up to
    /// whole seconds, so callers can surface a retry hint.
    pub fn check(&self, client: &str) -> GatewayResult<()> {
        if !self.enabled.load(Ordering::Relaxed) {
            return Ok(());
        }

        let now = now_millis();
        let mut bucket = self
            .buckets
            .entry(client.to_string())
            .or_insert(Bucket {
                count: 0,
                reset_at: now + self.window_ms,
            });

        // Lazy reset: an elapsed window is treated as absent.
        if bucket.reset_at <= now {
            bucket.count = 0;
            bucket.reset_at = now + self.window_ms;
        }

        bucket.count += 1;
        if bucket.count > self.max_requests {
            let retry_after = (bucket.reset_at - now).div_ceil(1000);
            drop(bucket);
            tracing::warn!(client = %client, retry_after, "Rate limit exceeded");
            return Err(GatewayError::RateLimit { retry_after });
        }
        Ok(())
    }

    /// Toggle limiting at runtime. Counters are preserved either way.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        tracing::info!(enabled, "Rate limiting toggled");
    }

    /// Whether limiting is currently active.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Remove buckets whose window has already ended.
    pub fn sweep(&self) {
        let now = now_millis();
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| bucket.reset_at > now);
        let removed = before - self.buckets.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate limit buckets");
        }
    }

    /// Number of tracked clients, stale buckets included.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Spawn the periodic sweep task; the interval equals the window size.
    ///
    /// Runs until the shutdown broadcast fires.
    pub fn spawn_sweeper(self: &Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let limiter = Arc::clone(self);
        let interval = Duration::from_millis(limiter.window_ms);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => limiter.sweep(),
                    _ = shutdown.recv() => {
                        tracing::debug!("Rate limit sweeper stopped");
                        break;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max_then_rejects() {
        let limiter = RateLimiter::new(3, 60_000, true);
        for _ in 0..3 {
            assert!(limiter.check("client-a").is_ok());
        }
        match limiter.check("client-a") {
            Err(GatewayError::RateLimit { retry_after }) => {
                assert!(retry_after >= 1);
                assert!(retry_after <= 60);
            }
            other => panic!("expected rate limit rejection, got {other:?}"),
        }
        // An unrelated client is unaffected.
        assert!(limiter.check("client-b").is_ok());
    }

    #[test]
    fn test_elapsed_window_resets_lazily() {
        let limiter = RateLimiter::new(1, 10, true);
        assert!(limiter.check("c").is_ok());
        assert!(limiter.check("c").is_err());

        std::thread::sleep(Duration::from_millis(15));
        // No sweeper ran; the stale bucket is replaced on access.
        assert!(limiter.check("c").is_ok());
    }

    #[test]
    fn test_toggle_preserves_counters() {
        let limiter = RateLimiter::new(1, 60_000, true);
        assert!(limiter.check("c").is_ok());
        assert!(limiter.check("c").is_err());

        limiter.set_enabled(false);
        assert!(limiter.check("c").is_ok());

        limiter.set_enabled(true);
        assert!(limiter.check("c").is_err());
    }

    #[test]
    fn test_sweep_removes_only_stale_buckets() {
        let limiter = RateLimiter::new(5, 10, true);
        limiter.check("stale").unwrap();
        std::thread::sleep(Duration::from_millis(15));
        limiter.check("fresh").unwrap();

        limiter.sweep();
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
