// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the submission endpoint.
//!
//! One window per client IP, anchored at the first request of the window.
//! The check-and-increment runs under a single write-lock acquisition so
//! concurrent bursts from one client never undercount.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a quota check.
#[derive(Debug, Clone)]
pub enum RateLimitDecision {
    /// Request is allowed
    Allowed {
        /// Configured window quota
        limit: u32,
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Configured window quota
        limit: u32,
        /// Time until the window elapses
        retry_after: Duration,
    },
}

/// Per-client window state.
#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Thread-safe submission limiter.
pub struct SubmissionLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
}

impl SubmissionLimiter {
    /// Create a limiter backed by the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create a limiter with an injected clock.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Consume one unit of quota for `key` and report the outcome.
    ///
    /// Every call counts against the window, including calls that end up
    /// limited. A fully elapsed window is reset before counting.
    pub async fn check(&self, key: IpAddr) -> RateLimitDecision {
        let now = self.clock.now();
        let window_len = self.config.window_duration();

        let mut windows = self.windows.write().await;
        let window = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        let reset_in = window_len - now.duration_since(window.started);

        if window.count <= self.config.max_submissions {
            debug!(%key, count = window.count, "submission allowed");
            RateLimitDecision::Allowed {
                limit: self.config.max_submissions,
                remaining: self.config.max_submissions - window.count,
                reset_in,
            }
        } else {
            debug!(%key, count = window.count, "submission quota exceeded");
            RateLimitDecision::Limited {
                limit: self.config.max_submissions,
                retry_after: reset_in,
            }
        }
    }

    /// Drop windows that have fully elapsed (should be called periodically).
    ///
    /// Only elapsed windows are dropped, so pruning never restores quota
    /// inside a live window.
    pub async fn cleanup(&self) {
        let now = self.clock.now();
        let window_len = self.config.window_duration();

        let mut windows = self.windows.write().await;
        windows.retain(|_, w| now.duration_since(w.started) < window_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::net::Ipv4Addr;

    fn limiter_at(clock: &MockClock, max: u32) -> SubmissionLimiter {
        SubmissionLimiter::with_clock(
            RateLimitConfig {
                max_submissions: max,
                window_secs: 300,
            },
            Arc::new(clock.clone()),
        )
    }

    #[tokio::test]
    async fn test_quota_exhaustion() {
        let clock = MockClock::new(Instant::now());
        let limiter = limiter_at(&clock, 5);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

        for i in 0..5 {
            match limiter.check(ip).await {
                RateLimitDecision::Allowed { remaining, .. } => {
                    assert_eq!(remaining, 4 - i);
                }
                RateLimitDecision::Limited { .. } => panic!("request {} should be allowed", i + 1),
            }
        }

        match limiter.check(ip).await {
            RateLimitDecision::Limited { limit, retry_after } => {
                assert_eq!(limit, 5);
                assert!(retry_after <= Duration::from_secs(300));
            }
            RateLimitDecision::Allowed { .. } => panic!("6th request should be limited"),
        }
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let clock = MockClock::new(Instant::now());
        let limiter = limiter_at(&clock, 2);
        let first = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let second = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        for _ in 0..2 {
            assert!(matches!(
                limiter.check(first).await,
                RateLimitDecision::Allowed { .. }
            ));
        }
        assert!(matches!(
            limiter.check(first).await,
            RateLimitDecision::Limited { .. }
        ));

        // Other clients keep their full quota
        assert!(matches!(
            limiter.check(second).await,
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_window_elapse_restores_quota() {
        let clock = MockClock::new(Instant::now());
        let limiter = limiter_at(&clock, 1);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3));

        assert!(matches!(
            limiter.check(ip).await,
            RateLimitDecision::Allowed { .. }
        ));
        assert!(matches!(
            limiter.check(ip).await,
            RateLimitDecision::Limited { .. }
        ));

        clock.advance(Duration::from_secs(300));
        assert!(matches!(
            limiter.check(ip).await,
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_limited_requests_do_not_extend_window() {
        let clock = MockClock::new(Instant::now());
        let limiter = limiter_at(&clock, 1);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4));

        limiter.check(ip).await;
        clock.advance(Duration::from_secs(299));
        assert!(matches!(
            limiter.check(ip).await,
            RateLimitDecision::Limited { retry_after, .. } if retry_after <= Duration::from_secs(1)
        ));

        clock.advance(Duration::from_secs(1));
        assert!(matches!(
            limiter.check(ip).await,
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_cleanup_drops_only_elapsed_windows() {
        let clock = MockClock::new(Instant::now());
        let limiter = limiter_at(&clock, 5);
        let stale = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));
        let live = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6));

        limiter.check(stale).await;
        clock.advance(Duration::from_secs(200));
        for _ in 0..5 {
            limiter.check(live).await;
        }
        clock.advance(Duration::from_secs(100));

        limiter.cleanup().await;

        let windows = limiter.windows.read().await;
        assert!(!windows.contains_key(&stale));
        assert!(windows.contains_key(&live));
        drop(windows);

        // The live window still has no quota left
        assert!(matches!(
            limiter.check(live).await,
            RateLimitDecision::Limited { .. }
        ));
    }
}
