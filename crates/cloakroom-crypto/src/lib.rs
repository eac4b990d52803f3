//! Cloakroom Cryptographic Primitives
//!
//! Everything a client needs to turn a passphrase into a shared room key and
//! to move messages through an untrusted transport.
//!
//! # Key Lifecycle
//!
//! ```text
//! Passphrase + Salt
//!        │
//!        ▼
//! PBKDF2-HMAC-SHA256 (100k rounds) → Wrapping Key
//!        │
//!        ▼
//! AES-256-GCM(Room Key) → Wrapped Blob (salt ‖ nonce ‖ ciphertext ‖ tag)
//!        │                    │
//!        │                    └─► Relay (keyed by room code, TTL)
//!        ▼
//! Room Key (256-bit, random)
//!        │
//!        ▼
//! AES-256-GCM(Message) → "[SECURE-MSG] " ‖ base64(nonce ‖ ciphertext ‖ tag)
//! ```
//!
//! # Security
//!
//! Confidentiality and integrity:
//! - AES-256-GCM with a 128-bit tag for both key wrapping and messages
//! - A failed tag is reported as [`CryptoError::AuthenticationFailure`] and
//!   nothing else; wrong passphrase, wrong key and tampering look identical
//! - No partial plaintext is ever returned
//!
//! Uniqueness:
//! - Fresh random 96-bit nonce per seal, fresh random 128-bit salt per wrap
//! - Randomness comes from [`cloakroom_core::Environment::random_bytes`]
//!
//! Not provided: forward secrecy across rooms, participant authentication
//! beyond passphrase knowledge, metadata (length, timing) protection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aead;
mod error;
mod kdf;
mod message;
mod room_code;
mod room_key;
mod wrap;

pub use aead::{KEY_SIZE, NONCE_SIZE, Sealed, TAG_SIZE, open, seal};
pub use error::CryptoError;
pub use kdf::{PBKDF2_ROUNDS, SALT_SIZE, derive_wrapping_key};
pub use message::{is_secure_message, open_message, seal_message};
pub use room_code::generate_room_code;
pub use room_key::RoomKey;
pub use wrap::{unwrap_room_key, wrap_room_key};
