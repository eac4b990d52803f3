//! Production environment backed by the OS clock and RNG.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::env::Environment;

/// Real time, Tokio sleep and getrandom.
///
/// # Panics
///
/// `random_bytes` panics if the OS RNG fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    #[allow(clippy::disallowed_methods)]
    fn wall_clock_secs(&self) -> u64 {
        // A clock before 1970 is treated as the epoch itself
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - keys and nonces would repeat");
    }
}
