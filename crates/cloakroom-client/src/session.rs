//! Per-conversation session store.
//!
//! Maps a conversation identifier to the room key active in it. Listeners
//! registered with [`SessionStore::subscribe`] are told which conversation
//! changed on every `set` and `clear`, synchronously and in registration
//! order. Listeners receive only the identifier and must re-read the store:
//! by the time a listener runs another `set` or `clear` may have landed.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use cloakroom_crypto::RoomKey;

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Inner {
    sessions: Mutex<HashMap<String, RoomKey>>,
    listeners: Mutex<Listeners>,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Conversation → room key map with change notification.
///
/// Cloning yields another handle to the same store. Entries never expire on
/// their own; they leave only through [`clear`](Self::clear),
/// [`clear_all`](Self::clear_all) or dropping the last handle.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the key for `conversation`, then notify listeners.
    pub fn set(&self, conversation: &str, key: RoomKey) {
        self.sessions().insert(conversation.to_string(), key);
        tracing::debug!(conversation = %conversation, "session set");
        self.notify(conversation);
    }

    /// Active key for `conversation`, if any.
    pub fn get(&self, conversation: &str) -> Option<RoomKey> {
        self.sessions().get(conversation).cloned()
    }

    /// Whether `conversation` has an active key.
    pub fn has(&self, conversation: &str) -> bool {
        self.sessions().contains_key(conversation)
    }

    /// Remove the key for `conversation` and notify listeners.
    ///
    /// Listeners are notified even if there was no entry.
    pub fn clear(&self, conversation: &str) {
        let removed = self.sessions().remove(conversation).is_some();
        tracing::debug!(conversation = %conversation, removed, "session cleared");
        self.notify(conversation);
    }

    /// Remove every entry without notifying listeners.
    pub fn clear_all(&self) {
        self.sessions().clear();
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Register `listener` for change notifications.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.inner.listeners);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        Subscription { id, store: Arc::downgrade(&self.inner) }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, RoomKey>> {
        lock(&self.inner.sessions)
    }

    // Snapshot first so listeners may call back into the store or
    // unsubscribe without deadlocking.
    fn notify(&self, conversation: &str) {
        let snapshot: Vec<Listener> =
            lock(&self.inner.listeners).entries.iter().map(|(_, l)| Arc::clone(l)).collect();

        for listener in snapshot {
            listener(conversation);
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("listeners", &lock(&self.inner.listeners).entries.len())
            .finish()
    }
}

/// Handle returned by [`SessionStore::subscribe`].
///
/// Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Unregister the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner.listeners).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn key(byte: u8) -> RoomKey {
        RoomKey::from_bytes([byte; 32])
    }

    #[test]
    fn set_get_has_clear() {
        let store = SessionStore::new();
        assert!(!store.has("chan-1"));

        store.set("chan-1", key(1));
        assert!(store.has("chan-1"));
        assert_eq!(store.get("chan-1"), Some(key(1)));
        assert_eq!(store.get("chan-2"), None);

        store.set("chan-1", key(2));
        assert_eq!(store.get("chan-1"), Some(key(2)));

        store.clear("chan-1");
        assert!(!store.has("chan-1"));
        assert!(store.is_empty());
    }

    #[test]
    fn listeners_notified_in_registration_order() {
        let store = SessionStore::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let log = Arc::clone(&log);
            store.subscribe(move |c| log.lock().unwrap().push(format!("a:{c}")))
        };
        let second = {
            let log = Arc::clone(&log);
            store.subscribe(move |c| log.lock().unwrap().push(format!("b:{c}")))
        };

        store.set("x", key(1));
        store.clear("x");

        assert_eq!(*log.lock().unwrap(), vec!["a:x", "b:x", "a:x", "b:x"]);
        drop((first, second));
    }

    #[test]
    fn clear_all_does_not_notify() {
        let store = SessionStore::new();
        store.set("a", key(1));
        store.set("b", key(2));

        let calls = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let calls = Arc::clone(&calls);
            store.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        store.clear_all();

        assert!(store.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = SessionStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let sub = {
            let calls = Arc::clone(&calls);
            store.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        store.set("a", key(1));
        sub.unsubscribe();
        store.set("a", key(2));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_can_reenter_store() {
        let store = SessionStore::new();
        let seen = Arc::new(Mutex::new(None));
        let _sub = {
            let store = store.clone();
            let seen = Arc::clone(&seen);
            store.clone().subscribe(move |c| *seen.lock().unwrap() = Some(store.has(c)))
        };

        store.set("a", key(1));
        assert_eq!(*seen.lock().unwrap(), Some(true));

        store.clear("a");
        assert_eq!(*seen.lock().unwrap(), Some(false));
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();

        store.set("a", key(7));
        assert_eq!(other.get("a"), Some(key(7)));
    }

    #[test]
    fn stores_are_independent() {
        let a = SessionStore::new();
        let b = SessionStore::new();

        a.set("chan", key(1));
        assert!(!b.has("chan"));
    }
}
