//! Per-client, per-room lookup quota.
//!
//! Counters live in this process only. Several relay instances behind a
//! load balancer each enforce the quota independently.

use std::{
    collections::HashMap,
    ops::Add,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use cloakroom_proto::RoomCode;

use crate::config::MAX_RELAY_DURATION;

/// Quota settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Lookups allowed per client and room within one window
    pub max_attempts: u32,
    /// Window length, measured from the first lookup
    pub window: Duration,
}

impl RateLimitConfig {
    /// Copy with the window capped at [`MAX_RELAY_DURATION`].
    pub fn clamped(self) -> Self {
        Self { window: self.window.min(MAX_RELAY_DURATION), ..self }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_attempts: 10, window: Duration::from_secs(3600) }
    }
}

#[derive(Debug, Clone, Copy)]
struct Counter<I> {
    count: u32,
    reset_at: I,
}

/// Fixed-window counter keyed by `(client, room code)`.
///
/// A window opens on the first lookup and lasts `window`. Counters for
/// different clients or different codes never interact.
#[derive(Debug)]
pub struct RateLimiter<I> {
    config: RateLimitConfig,
    counters: Mutex<HashMap<(String, RoomCode), Counter<I>>>,
}

impl<I> RateLimiter<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Limiter enforcing `config`, with the window capped at
    /// [`MAX_RELAY_DURATION`].
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config: config.clamped(), counters: Mutex::new(HashMap::new()) }
    }

    /// Count one lookup. Returns `false` if the quota is exhausted.
    ///
    /// Rejected lookups are not counted.
    pub fn check(&self, client: &str, code: &RoomCode, now: I) -> bool {
        let mut counters = self.lock();
        let key = (client.to_string(), code.clone());

        match counters.get_mut(&key) {
            Some(counter) if now <= counter.reset_at => {
                if counter.count >= self.config.max_attempts {
                    return false;
                }
                counter.count += 1;
                true
            },
            _ => {
                counters.insert(key, Counter { count: 1, reset_at: now + self.config.window });
                true
            },
        }
    }

    /// Drop counters whose window has elapsed. Returns how many were dropped.
    pub fn purge_expired(&self, now: I) -> usize {
        let mut counters = self.lock();
        let before = counters.len();
        counters.retain(|_, counter| now <= counter.reset_at);
        before - counters.len()
    }

    /// Number of live counters.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no counters are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Active settings.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, RoomCode), Counter<I>>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
