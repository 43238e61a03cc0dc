//! Per-client token buckets.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;

/// Time source for the limiter, injectable so tests can step time by hand.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_seen: Instant,
}

/// A token bucket per key: `burst` requests up front, refilled at
/// `rate_per_sec`. Idle keys are dropped by [`KeyedRateLimiter::sweep`].
#[derive(Debug)]
pub struct KeyedRateLimiter<C = SystemClock> {
    rate_per_sec: f64,
    burst: f64,
    clock: C,
    buckets: DashMap<String, Bucket>,
}

impl KeyedRateLimiter<SystemClock> {
    #[must_use]
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self::with_clock(rate_per_sec, burst, SystemClock)
    }
}

impl<C: Clock> KeyedRateLimiter<C> {
    /// A zero `burst` is raised to one so every key can make at least one
    /// request.
    #[must_use]
    pub fn with_clock(rate_per_sec: u32, burst: u32, clock: C) -> Self {
        Self {
            rate_per_sec: f64::from(rate_per_sec),
            burst: f64::from(burst.max(1)),
            clock,
            buckets: DashMap::new(),
        }
    }

    /// Spends one token from `key`'s bucket, creating a full bucket for an
    /// unseen key. Returns `false` when the bucket is empty.
    pub fn allow(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_seen: now,
        });
        let elapsed = now.saturating_duration_since(bucket.last_seen);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rate_per_sec).min(self.burst);
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drops every key idle for at least `max_idle` and returns how many were
    /// removed.
    pub fn sweep(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) < max_idle);
        before.saturating_sub(self.buckets.len())
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}

/// Sweeps `limiter` every `every`, dropping keys idle for `max_idle`.
pub fn spawn_sweeper<C: Clock>(
    limiter: Arc<KeyedRateLimiter<C>>,
    every: Duration,
    max_idle: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = limiter.sweep(max_idle);
            if removed > 0 {
                tracing::debug!(removed, "rate limiter: swept idle clients");
            }
        }
    })
}
