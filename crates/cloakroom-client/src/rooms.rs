//! Room create, join and leave flows.

use cloakroom_core::Environment;
use cloakroom_crypto::{RoomKey, generate_room_code, unwrap_room_key, wrap_room_key};
use cloakroom_proto::RoomCode;

use crate::{
    config::ClientConfig,
    error::ClientError,
    relay::{RelayClient, RelayTransport},
    session::SessionStore,
};

/// Drives room setup for conversations.
///
/// The session store is only touched after every remote and cryptographic
/// step has succeeded, so a failed create or join leaves the conversation's
/// previous state in place.
#[derive(Debug, Clone)]
pub struct RoomManager<E, T> {
    env: E,
    sessions: SessionStore,
    config: ClientConfig,
    transport: T,
}

impl<E: Environment, T: RelayTransport> RoomManager<E, T> {
    /// Create a manager writing into `sessions`.
    pub fn new(env: E, sessions: SessionStore, config: ClientConfig, transport: T) -> Self {
        Self { env, sessions, config, transport }
    }

    /// The session store this manager writes into.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a room for `conversation` protected by `passphrase`.
    ///
    /// Generates a room key, wraps it, publishes it under a fresh code and
    /// activates it for the conversation. Returns the code to share.
    pub async fn create_room(
        &self,
        conversation: &str,
        passphrase: &str,
    ) -> Result<RoomCode, ClientError> {
        let relay = self.relay()?;

        let key = RoomKey::generate(&self.env);
        let blob = wrap_room_key(&key, passphrase, &self.env)?;
        let code = generate_room_code(&self.env);

        let stored = relay.create_room(&code, &blob).await?;
        self.sessions.set(conversation, key);

        tracing::info!(conversation = %conversation, room_code = %stored, "room created");
        Ok(stored)
    }

    /// Join the room `code` for `conversation` using `passphrase`.
    ///
    /// The code is validated locally first, so a malformed code never reaches
    /// the relay.
    pub async fn join_room(
        &self,
        conversation: &str,
        code: &str,
        passphrase: &str,
    ) -> Result<RoomCode, ClientError> {
        let relay = self.relay()?;
        let code = RoomCode::parse(code.trim())?;

        let blob = relay.fetch_room(&code).await?;
        let key = unwrap_room_key(&blob, passphrase).inspect_err(|e| {
            tracing::debug!(room_code = %code, error = %e, "unwrap failed");
        })?;
        self.sessions.set(conversation, key);

        tracing::info!(conversation = %conversation, room_code = %code, "room joined");
        Ok(code)
    }

    /// End the session for `conversation`. Returns whether one was active.
    pub fn leave_room(&self, conversation: &str) -> bool {
        let active = self.sessions.has(conversation);
        self.sessions.clear(conversation);
        tracing::info!(conversation = %conversation, active, "room left");
        active
    }

    fn relay(&self) -> Result<RelayClient<&T>, ClientError> {
        Ok(RelayClient::new(&self.transport, self.config.relay_base()?))
    }
}
