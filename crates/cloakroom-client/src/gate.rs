//! Message gate between the host transport and the room cipher.
//!
//! Outbound, every message in a conversation with an active session is
//! enveloped. Inbound, a secure message is decrypted only if it is fresh and
//! the conversation has a key; stale envelopes are never handed to the
//! cipher.

use std::time::Duration;

use cloakroom_core::Environment;
use cloakroom_crypto::{is_secure_message, open_message, seal_message};

use crate::{config::ClientConfig, error::ClientError, session::SessionStore};

/// What to show for an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Not an envelope; show as is
    Plain,
    /// Envelope older than the freshness window; not decrypted
    Expired,
    /// Envelope in a conversation without an active session
    Locked,
    /// Envelope left for the user to reveal because auto-decrypt is off
    Deferred,
    /// Decrypted text
    Decrypted(String),
    /// Envelope did not open under the session key
    Failed,
}

/// Applies session state and freshness policy to messages.
#[derive(Debug, Clone)]
pub struct MessageGate<E> {
    env: E,
    sessions: SessionStore,
    auto_decrypt: bool,
    freshness_window: Duration,
}

impl<E: Environment> MessageGate<E> {
    /// Gate reading keys from `sessions` under `config`'s policy.
    pub fn new(env: E, sessions: SessionStore, config: &ClientConfig) -> Self {
        Self {
            env,
            sessions,
            auto_decrypt: config.auto_decrypt,
            freshness_window: config.freshness_window,
        }
    }

    /// Transform an outgoing message.
    ///
    /// Empty messages, messages that already carry the marker and messages
    /// in conversations without a session pass through unchanged.
    ///
    /// # Errors
    ///
    /// Enveloping failed. The caller must not send the original text.
    pub fn outbound(&self, conversation: &str, content: &str) -> Result<String, ClientError> {
        if content.is_empty() || is_secure_message(content) {
            return Ok(content.to_string());
        }

        let Some(key) = self.sessions.get(conversation) else {
            return Ok(content.to_string());
        };

        seal_message(content, &key, &self.env).map_err(|e| {
            tracing::error!(conversation = %conversation, error = %e, "failed to envelope message");
            ClientError::from(e)
        })
    }

    /// Classify and, policy permitting, decrypt an incoming message.
    ///
    /// `sent_at` is the host transport's timestamp in Unix seconds. A missing
    /// timestamp counts as now.
    pub fn inbound(&self, conversation: &str, content: &str, sent_at: Option<u64>) -> InboundMessage {
        self.classify(conversation, content, sent_at, self.auto_decrypt)
    }

    /// Decrypt a [`InboundMessage::Deferred`] message on user request.
    ///
    /// Freshness and session checks still apply.
    pub fn reveal(&self, conversation: &str, content: &str, sent_at: Option<u64>) -> InboundMessage {
        self.classify(conversation, content, sent_at, true)
    }

    /// Whether a message sent at `sent_at` is past the freshness window.
    pub fn is_expired(&self, sent_at: Option<u64>) -> bool {
        let now = self.env.wall_clock_secs();
        let age = now.saturating_sub(sent_at.unwrap_or(now));
        age > self.freshness_window.as_secs()
    }

    fn classify(
        &self,
        conversation: &str,
        content: &str,
        sent_at: Option<u64>,
        decrypt: bool,
    ) -> InboundMessage {
        if !is_secure_message(content) {
            return InboundMessage::Plain;
        }

        if self.is_expired(sent_at) {
            return InboundMessage::Expired;
        }

        let Some(key) = self.sessions.get(conversation) else {
            return InboundMessage::Locked;
        };

        if !decrypt {
            return InboundMessage::Deferred;
        }

        match open_message(content, &key) {
            Ok(text) => InboundMessage::Decrypted(text),
            Err(e) => {
                tracing::debug!(conversation = %conversation, error = %e, "failed to open message");
                InboundMessage::Failed
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use cloakroom_crypto::RoomKey;

    use super::*;
    use crate::testing::{START_SECS, TestEnv};

    const MINUTE: u64 = 60;

    fn gate_with_session(config: &ClientConfig) -> (MessageGate<TestEnv>, TestEnv) {
        let env = TestEnv::new(9);
        let sessions = SessionStore::new();
        sessions.set("chan", RoomKey::from_bytes([3; 32]));
        (MessageGate::new(env.clone(), sessions, config), env)
    }

    #[test]
    fn outbound_envelopes_in_active_session() {
        let (gate, _) = gate_with_session(&ClientConfig::default());

        let sent = gate.outbound("chan", "hello").unwrap();

        assert!(is_secure_message(&sent));
        assert_eq!(gate.inbound("chan", &sent, None), InboundMessage::Decrypted("hello".into()));
    }

    #[test]
    fn outbound_pass_through() {
        let (gate, _) = gate_with_session(&ClientConfig::default());

        assert_eq!(gate.outbound("other", "hello").unwrap(), "hello");
        assert_eq!(gate.outbound("chan", "").unwrap(), "");

        let already = gate.outbound("chan", "hi").unwrap();
        assert_eq!(gate.outbound("chan", &already).unwrap(), already);
    }

    #[test]
    fn plain_inbound_untouched() {
        let (gate, _) = gate_with_session(&ClientConfig::default());
        assert_eq!(gate.inbound("chan", "hello", None), InboundMessage::Plain);
    }

    #[test]
    fn freshness_boundary() {
        let (gate, _) = gate_with_session(&ClientConfig::default());
        let sent = gate.outbound("chan", "hello").unwrap();

        let sixty = Some(START_SECS - 60 * MINUTE);
        let sixty_one = Some(START_SECS - 61 * MINUTE);

        assert_eq!(gate.inbound("chan", &sent, sixty), InboundMessage::Decrypted("hello".into()));
        assert_eq!(gate.inbound("chan", &sent, sixty_one), InboundMessage::Expired);
    }

    #[test]
    fn expiry_follows_clock() {
        let (gate, env) = gate_with_session(&ClientConfig::default());
        let sent = gate.outbound("chan", "hello").unwrap();
        let sent_at = Some(START_SECS);

        env.advance(Duration::from_secs(61 * MINUTE));
        assert_eq!(gate.inbound("chan", &sent, sent_at), InboundMessage::Expired);
    }

    #[test]
    fn expired_wins_over_missing_session() {
        let (gate, _) = gate_with_session(&ClientConfig::default());
        let sent = gate.outbound("chan", "hello").unwrap();

        let stale = Some(START_SECS - 61 * MINUTE);
        assert_eq!(gate.inbound("nobody", &sent, stale), InboundMessage::Expired);
        assert_eq!(gate.inbound("nobody", &sent, None), InboundMessage::Locked);
    }

    #[test]
    fn future_timestamps_are_fresh() {
        let (gate, _) = gate_with_session(&ClientConfig::default());
        assert!(!gate.is_expired(Some(START_SECS + 10 * MINUTE)));
    }

    #[test]
    fn auto_decrypt_off_defers_until_revealed() {
        let config = ClientConfig { auto_decrypt: false, ..ClientConfig::default() };
        let (gate, _) = gate_with_session(&config);
        let sent = gate.outbound("chan", "hello").unwrap();

        assert_eq!(gate.inbound("chan", &sent, None), InboundMessage::Deferred);
        assert_eq!(gate.reveal("chan", &sent, None), InboundMessage::Decrypted("hello".into()));
    }

    #[test]
    fn wrong_key_fails_quietly() {
        let (gate, env) = gate_with_session(&ClientConfig::default());
        let other = SessionStore::new();
        other.set("chan", RoomKey::from_bytes([4; 32]));
        let foreign = MessageGate::new(env, other, &ClientConfig::default());

        let sent = foreign.outbound("chan", "hello").unwrap();
        assert_eq!(gate.inbound("chan", &sent, None), InboundMessage::Failed);
    }
}
