//! Environment abstraction for deterministic testing.

use std::{
    ops::{Add, Sub},
    time::Duration,
};

/// Abstract environment providing time, randomness, and async sleep.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// Monotonic instant type.
    ///
    /// Production uses `std::time::Instant`; simulations use a manually
    /// advanced clock.
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + std::fmt::Debug
        + Sub<Output = Duration>
        + Add<Duration, Output = Self::Instant>;

    /// Current monotonic time.
    ///
    /// # Invariants
    ///
    /// - Subsequent calls return values `>=` previous calls.
    fn now(&self) -> Self::Instant;

    /// Seconds since the Unix epoch.
    ///
    /// Only used to compare against timestamps supplied by the host transport
    /// (message age). Never used for expiry bookkeeping.
    fn wall_clock_secs(&self) -> u64;

    /// Sleep for `duration`.
    ///
    /// Only background tasks (relay housekeeping) sleep; request handling
    /// never does.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fill `buffer` with random bytes.
    ///
    /// # Invariants
    ///
    /// - Uses a cryptographically secure source outside of tests
    /// - Every call is an independent draw; keys, salts and nonces rely on it
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Random fixed-size array.
    fn random_array<const N: usize>(&self) -> [u8; N] {
        let mut bytes = [0u8; N];
        self.random_bytes(&mut bytes);
        bytes
    }
}
