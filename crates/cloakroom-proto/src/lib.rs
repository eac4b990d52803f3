//! Cloakroom wire protocol.
//!
//! Types that cross the boundary between a client and the key-exchange relay,
//! plus the literal that marks an enveloped message on the host transport.
//!
//! # Relay API
//!
//! ```text
//! POST /room              {roomCode, encryptedBlob} -> 200 {success, roomCode}
//! GET  /room/{roomCode}                             -> 200 {encryptedBlob}
//! ```
//!
//! Every non-200 response carries `{error}`. Status codes 400, 404 and 429
//! map to invalid input, unknown/expired room and rate limiting respectively.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod room_code;
mod wire;

pub use room_code::{
    GENERATED_CODE_LEN, MAX_CODE_LEN, MIN_CODE_LEN, ROOM_CODE_ALPHABET, RoomCode, RoomCodeError,
};
pub use wire::{CreateRoomRequest, CreateRoomResponse, ErrorResponse, GetRoomResponse};

/// Literal prefix carried by every enveloped message on the host transport.
///
/// Consumers that don't understand the marker see an opaque token.
pub const SECURE_MESSAGE_MARKER: &str = "[SECURE-MSG]";

/// Route for storing a wrapped room key.
pub const ROOM_PATH: &str = "/room";

/// Relay path for fetching the wrapped key of `code`.
pub fn room_path(code: &str) -> String {
    format!("{ROOM_PATH}/{code}")
}
