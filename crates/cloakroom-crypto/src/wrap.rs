//! Passphrase wrapping of room keys for transport through the relay.
//!
//! Blob layout before base64:
//!
//! ```text
//! ┌──────────┬───────────┬────────────────────────────┐
//! │ salt (16)│ nonce (12)│ ciphertext (32) ‖ tag (16) │
//! └──────────┴───────────┴────────────────────────────┘
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD};
use cloakroom_core::Environment;

use crate::{
    aead::{NONCE_SIZE, TAG_SIZE, open, seal},
    error::CryptoError,
    kdf::{SALT_SIZE, derive_wrapping_key},
    room_key::RoomKey,
};

/// Wrap `key` under `passphrase`, returning a base64 blob.
///
/// Draws a fresh salt and a fresh nonce, so wrapping the same key twice with
/// the same passphrase yields unrelated blobs.
pub fn wrap_room_key(
    key: &RoomKey,
    passphrase: &str,
    env: &impl Environment,
) -> Result<String, CryptoError> {
    let salt: [u8; SALT_SIZE] = env.random_array();
    let wrapping_key = derive_wrapping_key(passphrase, &salt);
    let sealed = seal(key.as_bytes(), &wrapping_key, env)?;

    let mut blob = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + sealed.ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&sealed.nonce);
    blob.extend_from_slice(&sealed.ciphertext);

    Ok(STANDARD.encode(blob))
}

/// Recover a room key from a blob produced by [`wrap_room_key`].
///
/// Layout is checked before key derivation so garbage input never pays the
/// PBKDF2 cost.
///
/// # Errors
///
/// - `MalformedBlob` if the blob is not base64 or too short for the layout
/// - `AuthenticationFailure` for a wrong passphrase or a tampered blob
pub fn unwrap_room_key(blob: &str, passphrase: &str) -> Result<RoomKey, CryptoError> {
    let bytes = STANDARD
        .decode(blob.trim())
        .map_err(|e| CryptoError::malformed(format!("invalid base64: {e}")))?;

    if bytes.len() < SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::malformed(format!(
            "wrapped key is {} bytes, need at least {}",
            bytes.len(),
            SALT_SIZE + NONCE_SIZE + TAG_SIZE
        )));
    }

    let (salt, rest) = bytes.split_at(SALT_SIZE);
    let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

    let mut salt_bytes = [0u8; SALT_SIZE];
    salt_bytes.copy_from_slice(salt);
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    nonce_bytes.copy_from_slice(nonce);

    let wrapping_key = derive_wrapping_key(passphrase, &salt_bytes);
    let plaintext = zeroize::Zeroizing::new(open(&nonce_bytes, ciphertext, &wrapping_key)?);

    RoomKey::from_slice(&plaintext)
}
