//! JSON bodies exchanged with the relay.
//!
//! Field names are camelCase on the wire. Request fields default to empty so
//! the relay can report a missing field as invalid input rather than a parse
//! failure.

use serde::{Deserialize, Serialize};

/// Body of `POST /room`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Code the creator generated for the room
    #[serde(default)]
    pub room_code: String,
    /// Base64 wrapped room key
    #[serde(default)]
    pub encrypted_blob: String,
}

/// Success body of `POST /room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// Always `true`
    pub success: bool,
    /// Normalized (upper-case) room code the blob was stored under
    pub room_code: String,
}

/// Success body of `GET /room/{roomCode}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRoomResponse {
    /// Base64 wrapped room key
    pub encrypted_blob: String,
}

/// Body of every non-200 relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub error: String,
}

impl ErrorResponse {
    /// Wrap a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
