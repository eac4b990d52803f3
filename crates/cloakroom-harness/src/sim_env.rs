//! Simulated environment.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use cloakroom_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Unix time the simulated wall clock starts at.
pub const SIM_EPOCH_SECS: u64 = 1_700_000_000;

/// Environment with a manual clock and seeded randomness.
///
/// Instants are offsets from the start of the simulation. Clones share the
/// clock and the RNG, so every component built from one `SimEnv` sees the
/// same time.
///
/// `sleep` advances the clock by the requested duration and yields once;
/// nothing ever waits in real time.
#[derive(Clone)]
pub struct SimEnv {
    elapsed: Arc<Mutex<Duration>>,
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl SimEnv {
    /// Environment seeded with 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment whose random stream is fixed by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *lock(&self.elapsed) += by;
    }

    /// Time since the simulation started.
    pub fn elapsed(&self) -> Duration {
        *lock(&self.elapsed)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimEnv").field("elapsed", &self.elapsed()).finish_non_exhaustive()
    }
}

impl Environment for SimEnv {
    type Instant = Duration;

    fn now(&self) -> Duration {
        self.elapsed()
    }

    fn wall_clock_secs(&self) -> u64 {
        SIM_EPOCH_SECS + self.elapsed().as_secs()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        tokio::task::yield_now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        lock(&self.rng).fill_bytes(buffer);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_moves_when_advanced() {
        let env = SimEnv::new();
        let start = env.now();
        assert_eq!(env.now(), start);

        env.advance(Duration::from_secs(90));
        assert_eq!(env.now() - start, Duration::from_secs(90));
        assert_eq!(env.wall_clock_secs(), SIM_EPOCH_SECS + 90);
    }

    #[test]
    fn clones_share_clock() {
        let env = SimEnv::new();
        let other = env.clone();

        env.advance(Duration::from_secs(5));
        assert_eq!(other.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn same_seed_same_bytes() {
        let a: [u8; 32] = SimEnv::with_seed(7).random_array();
        let b: [u8; 32] = SimEnv::with_seed(7).random_array();
        let c: [u8; 32] = SimEnv::with_seed(8).random_array();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn successive_draws_differ() {
        let env = SimEnv::with_seed(1);
        let a: [u8; 16] = env.random_array();
        let b: [u8; 16] = env.random_array();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn sleep_advances_clock() {
        let env = SimEnv::new();
        env.sleep(Duration::from_secs(60)).await;
        assert_eq!(env.elapsed(), Duration::from_secs(60));
    }
}
