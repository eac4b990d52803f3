use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use cloakroom_proto::RoomCode;

use super::{RoomStore, StorageError};

struct Record<I> {
    blob: String,
    expires_at: I,
}

/// In-memory room store.
///
/// Expired records stay in the map until [`RoomStore::purge_expired`] runs
/// but are invisible to `get`.
pub struct MemoryRoomStore<I> {
    inner: Arc<Mutex<HashMap<RoomCode, Record<I>>>>,
}

impl<I> MemoryRoomStore<I> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Records held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no records are held.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomCode, Record<I>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<I> Clone for MemoryRoomStore<I> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<I> Default for MemoryRoomStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> fmt::Debug for MemoryRoomStore<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRoomStore").field("records", &self.len()).finish()
    }
}

impl<I> RoomStore<I> for MemoryRoomStore<I>
where
    I: Copy + Ord + Send + 'static,
{
    fn put(&self, code: &RoomCode, blob: &str, expires_at: I) -> Result<(), StorageError> {
        self.lock().insert(code.clone(), Record { blob: blob.to_string(), expires_at });
        Ok(())
    }

    fn get(&self, code: &RoomCode, now: I) -> Result<Option<String>, StorageError> {
        Ok(self
            .lock()
            .get(code)
            .filter(|record| now < record.expires_at)
            .map(|record| record.blob.clone()))
    }

    fn purge_expired(&self, now: I) -> Result<usize, StorageError> {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, record| now < record.expires_at);
        Ok(before - records.len())
    }
}
