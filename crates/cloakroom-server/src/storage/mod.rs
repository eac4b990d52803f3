//! Storage abstraction for wrapped room keys.
//!
//! The trait is synchronous and generic over the environment's instant type,
//! so expiry can be driven by a simulated clock. Implementations share state
//! through `Arc`; clones address the same records.

mod memory;

use cloakroom_proto::RoomCode;
pub use memory::MemoryRoomStore;
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Backing store is unreachable or refused the operation
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether retrying the operation later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Time-limited blob store keyed by room code.
///
/// # Invariants
///
/// - A record whose `expires_at` is not after `now` is never returned
/// - `put` on an existing code replaces the blob and its expiry
pub trait RoomStore<I>: Clone + Send + Sync + 'static {
    /// Store `blob` under `code` until `expires_at`.
    fn put(&self, code: &RoomCode, blob: &str, expires_at: I) -> Result<(), StorageError>;

    /// Blob stored under `code`, if it is still live at `now`.
    fn get(&self, code: &RoomCode, now: I) -> Result<Option<String>, StorageError>;

    /// Drop every record expired at `now`. Returns how many were dropped.
    ///
    /// Never changes what `get` returns.
    fn purge_expired(&self, now: I) -> Result<usize, StorageError>;
}
