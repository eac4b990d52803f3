//! Room exchange: stores wrapped room keys under room codes and serves them
//! back until they expire.
//!
//! ```text
//! absent ──create──▶ stored ──ttl elapses──▶ absent
//!                      ▲  │
//!                      └──┘ create (same code): replace blob, restart ttl
//! ```
//!
//! Reads do not consume a record; any number of joiners may fetch it.

use std::fmt;

use cloakroom_core::Environment;
use cloakroom_proto::RoomCode;
use thiserror::Error;

use crate::{
    config::RelayConfig,
    rate_limit::RateLimiter,
    storage::{RoomStore, StorageError},
};

/// Why a create or get was refused.
///
/// Display strings are the texts returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Missing field or malformed room code
    #[error("{0}")]
    InvalidRequest(String),

    /// No live record for the code
    #[error("Room not found or expired")]
    NotFound,

    /// Lookup quota exhausted for this client and code
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Backing store failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ExchangeError {
    fn invalid(reason: &str) -> Self {
        Self::InvalidRequest(reason.to_string())
    }
}

/// What one housekeeping pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Expired room records dropped
    pub rooms: usize,
    /// Elapsed rate-limit counters dropped
    pub counters: usize,
}

/// The relay's create/get logic, independent of HTTP.
pub struct RoomExchangeService<E: Environment, S> {
    env: E,
    store: S,
    limiter: RateLimiter<E::Instant>,
    config: RelayConfig,
}

impl<E, S> RoomExchangeService<E, S>
where
    E: Environment,
    S: RoomStore<E::Instant>,
{
    /// Service over `store` enforcing `config`, with durations capped at
    /// [`MAX_RELAY_DURATION`](crate::MAX_RELAY_DURATION).
    pub fn new(env: E, store: S, config: RelayConfig) -> Self {
        let config = config.clamped();
        let limiter = RateLimiter::new(config.rate_limit);
        Self { env, store, limiter, config }
    }

    /// Store `blob` under `room_code` for the configured TTL.
    ///
    /// An existing record under the same code is replaced and its TTL
    /// restarted. Returns the normalized code.
    pub fn create(&self, room_code: &str, blob: &str) -> Result<RoomCode, ExchangeError> {
        if room_code.is_empty() || blob.is_empty() {
            return Err(ExchangeError::invalid("Missing roomCode or encryptedBlob"));
        }
        let code =
            RoomCode::parse(room_code).map_err(|_| ExchangeError::invalid("Invalid room code format"))?;

        let expires_at = self.env.now() + self.config.room_ttl;
        self.store.put(&code, blob, expires_at)?;

        tracing::info!(room_code = %code, blob_len = blob.len(), "room stored");
        Ok(code)
    }

    /// Wrapped key stored under `room_code`, on behalf of `client`.
    ///
    /// Checks run in order: code format, `client`'s quota for the code,
    /// record lookup. Lookups for unknown codes count against the quota.
    pub fn get(&self, client: &str, room_code: &str) -> Result<String, ExchangeError> {
        let code = RoomCode::parse(room_code).map_err(|_| ExchangeError::invalid("Invalid room code"))?;

        let now = self.env.now();
        if !self.limiter.check(client, &code, now) {
            tracing::warn!(client = %client, room_code = %code, "rate limit exceeded");
            return Err(ExchangeError::RateLimited);
        }

        match self.store.get(&code, now)? {
            Some(blob) => {
                tracing::debug!(room_code = %code, "room served");
                Ok(blob)
            },
            None => {
                tracing::debug!(room_code = %code, "room not found");
                Err(ExchangeError::NotFound)
            },
        }
    }

    /// Drop expired rooms and elapsed rate-limit counters.
    pub fn purge_expired(&self) -> Result<PurgeStats, ExchangeError> {
        let now = self.env.now();
        let rooms = self.store.purge_expired(now)?;
        let counters = self.limiter.purge_expired(now);
        Ok(PurgeStats { rooms, counters })
    }

    /// The environment this service reads time from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active policy.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

impl<E: Environment, S> fmt::Debug for RoomExchangeService<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomExchangeService").field("config", &self.config).finish_non_exhaustive()
    }
}
