//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Maximum age of an incoming secure message that is still decrypted.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Settings a host application provides, typically loaded from its own
/// settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the key-exchange relay, e.g. `https://relay.example.com`
    pub relay_url: Option<String>,

    /// Decrypt incoming secure messages in active sessions
    pub auto_decrypt: bool,

    /// Messages older than this are not decrypted
    #[serde(with = "duration_secs")]
    pub freshness_window: Duration,
}

impl ClientConfig {
    /// Config pointing at `relay_url` with default policy.
    pub fn with_relay(relay_url: impl Into<String>) -> Self {
        Self { relay_url: Some(relay_url.into()), ..Self::default() }
    }

    /// Relay base URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` if the URL is absent or blank
    pub fn relay_base(&self) -> Result<&str, ClientError> {
        match self.relay_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.trim_end_matches('/')),
            _ => Err(ClientError::NotConfigured),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { relay_url: None, auto_decrypt: true, freshness_window: DEFAULT_FRESHNESS_WINDOW }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
