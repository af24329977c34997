//! Rolling-window rate limiter for outbound API calls.
//!
//! One global window, persisted in the durable store so independent
//! short-lived invocations share the same quota. Callers treat a denied call
//! as a soft failure and abort the current operation; there is no queuing or
//! backoff here.

use std::sync::Arc;

use pushzone_store::{Clock, KvStore, get_json, set_json};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Durable-store key holding the rate-limit window record.
pub const RATE_LIMIT_KEY: &str = "rate_limit";

/// Calls permitted per rolling window.
pub const DEFAULT_QUOTA: u32 = 60;

/// Window length in seconds.
pub const WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RateLimitWindow {
    count: u32,
    window_start: i64,
}

/// Gate for outbound API calls: at most `quota` calls per rolling window.
#[derive(Clone)]
pub struct RateLimiter {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    quota: u32,
}

impl RateLimiter {
    /// Construct a limiter with the default quota.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kv,
            clock,
            quota: DEFAULT_QUOTA,
        }
    }

    /// Override the per-window quota.
    #[must_use]
    pub const fn with_quota(mut self, quota: u32) -> Self {
        self.quota = quota;
        self
    }

    /// Whether another API call may be issued right now.
    ///
    /// Resets the window when more than [`WINDOW_SECS`] have elapsed since
    /// it opened; otherwise counts the call against the quota. Not atomic:
    /// callers serialize access by processing files strictly sequentially.
    #[must_use]
    pub fn allow(&self) -> bool {
        let now = self.clock.now().timestamp();
        let window: Option<RateLimitWindow> = get_json(self.kv.as_ref(), RATE_LIMIT_KEY);

        let next = match window {
            Some(window) if now - window.window_start <= WINDOW_SECS => {
                if window.count >= self.quota {
                    warn!(
                        count = window.count,
                        quota = self.quota,
                        "api rate limit exceeded; try again later"
                    );
                    return false;
                }
                RateLimitWindow {
                    count: window.count + 1,
                    window_start: window.window_start,
                }
            }
            _ => RateLimitWindow {
                count: 1,
                window_start: now,
            },
        };

        set_json(self.kv.as_ref(), RATE_LIMIT_KEY, &next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pushzone_store::MemoryKv;
    use std::sync::{Mutex, PoisonError};

    struct TestClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Utc::now()),
            })
        }

        fn advance(&self, seconds: i64) {
            let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *guard += chrono::Duration::seconds(seconds);
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    fn limiter(clock: Arc<TestClock>) -> RateLimiter {
        RateLimiter::new(Arc::new(MemoryKv::new()), clock)
    }

    #[test]
    fn quota_boundary_within_one_window() {
        let clock = TestClock::new();
        let limiter = limiter(clock);

        for call in 1..=DEFAULT_QUOTA {
            assert!(limiter.allow(), "call {call} should be allowed");
        }
        assert!(!limiter.allow(), "61st call should be denied");
        assert!(!limiter.allow(), "denied calls do not consume quota");
    }

    #[test]
    fn window_resets_after_sixty_one_seconds() {
        let clock = TestClock::new();
        let limiter = limiter(clock.clone());

        for _ in 0..DEFAULT_QUOTA {
            assert!(limiter.allow());
        }
        assert!(!limiter.allow());

        clock.advance(WINDOW_SECS + 1);
        assert!(limiter.allow(), "fresh window should admit calls again");
    }

    #[test]
    fn calls_within_window_share_one_counter() {
        let clock = TestClock::new();
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKv::new());
        let first = RateLimiter::new(kv.clone(), clock.clone()).with_quota(2);
        let second = RateLimiter::new(kv, clock).with_quota(2);

        assert!(first.allow());
        assert!(second.allow());
        assert!(!first.allow(), "quota is shared through the store");
    }
}
