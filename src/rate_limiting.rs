// ABOUTME: Per-identity sliding-window admission control
// ABOUTME: Sharded state via DashMap so unrelated identities never contend
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Sliding-Window Rate Limiter
//!
//! Each identity owns an ordered sequence of admitted-request timestamps
//! within the trailing window. Admission purges expired entries, compares the
//! count against the ceiling, and records the new timestamp only when
//! admitted. Rejection has no side effects.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Sliding-window rate limiter keyed by opaque identity
pub struct RateLimiter {
    windows: DashMap<String, Vec<DateTime<Utc>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a limiter with the given window and ceiling
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Decide admission for one request from `identity` at `now`.
    ///
    /// Entries older than the window are purged first. When the remaining
    /// count is below the ceiling the request is recorded and admitted;
    /// otherwise it is rejected without recording.
    pub fn admit(&self, identity: &str, now: DateTime<Utc>) -> bool {
        let window = chrono::Duration::from_std(self.config.window).unwrap_or_else(|_| {
            debug!("rate limit window out of range, using 60s");
            chrono::Duration::seconds(60)
        });
        let cutoff = now - window;

        let mut entry = self.windows.entry(identity.to_owned()).or_default();
        entry.retain(|ts| *ts > cutoff);

        if entry.len() >= self.config.max_requests as usize {
            debug!(identity, count = entry.len(), "rate limit rejection");
            return false;
        }
        entry.push(now);
        true
    }

    /// Remove identities whose windows have fully expired.
    ///
    /// Keeps memory bounded across the whole user population; intended to
    /// run on a low-frequency background tick. Each shard lock is held only
    /// long enough to inspect one identity.
    pub fn sweep(&self, now: DateTime<Utc>) {
        let window = chrono::Duration::from_std(self.config.window)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let cutoff = now - window;
        let before = self.windows.len();
        self.windows
            .retain(|_, timestamps| timestamps.iter().any(|ts| *ts > cutoff));
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "rate limiter swept idle identities");
        }
    }

    /// Number of identities currently tracked
    #[must_use]
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(window_secs),
            max_requests: max,
        })
    }

    #[test]
    fn admits_up_to_ceiling_then_rejects() {
        let rl = limiter(3, 60);
        let now = Utc::now();
        assert!(rl.admit("u1", now));
        assert!(rl.admit("u1", now));
        assert!(rl.admit("u1", now));
        assert!(!rl.admit("u1", now));
        // A different identity is unaffected.
        assert!(rl.admit("u2", now));
    }

    #[test]
    fn admission_resumes_after_window_elapses() {
        let rl = limiter(2, 60);
        let t0 = Utc::now();
        assert!(rl.admit("u1", t0));
        assert!(rl.admit("u1", t0));
        assert!(!rl.admit("u1", t0));
        let t1 = t0 + chrono::Duration::seconds(61);
        assert!(rl.admit("u1", t1));
    }

    #[test]
    fn rejection_records_nothing() {
        let rl = limiter(1, 60);
        let t0 = Utc::now();
        assert!(rl.admit("u1", t0));
        for _ in 0..10 {
            assert!(!rl.admit("u1", t0));
        }
        // Window still holds exactly one timestamp, so one slot frees up
        // as soon as it expires.
        let t1 = t0 + chrono::Duration::seconds(61);
        assert!(rl.admit("u1", t1));
    }

    #[test]
    fn sweep_drops_idle_identities() {
        let rl = limiter(5, 60);
        let t0 = Utc::now();
        rl.admit("idle", t0);
        rl.admit("busy", t0);
        let t1 = t0 + chrono::Duration::seconds(120);
        rl.admit("busy", t1);
        rl.sweep(t1);
        assert_eq!(rl.tracked_identities(), 1);
    }
}
