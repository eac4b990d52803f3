//! Message envelopes carried over the host transport.
//!
//! Wire form: `"[SECURE-MSG] " ‖ base64(nonce ‖ ciphertext ‖ tag)`.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use cloakroom_core::Environment;
use cloakroom_proto::SECURE_MESSAGE_MARKER;

use crate::{
    aead::{Sealed, open, seal},
    error::CryptoError,
    room_key::RoomKey,
};

/// Whether `content` is an enveloped message.
pub fn is_secure_message(content: &str) -> bool {
    content.starts_with(SECURE_MESSAGE_MARKER)
}

/// Encrypt `message` under the room key and render it for the transport.
pub fn seal_message(
    message: &str,
    key: &RoomKey,
    env: &impl Environment,
) -> Result<String, CryptoError> {
    let sealed = seal(message.as_bytes(), key.as_bytes(), env)?;
    Ok(format!("{SECURE_MESSAGE_MARKER} {}", STANDARD.encode(sealed.to_bytes())))
}

/// Decrypt an envelope produced by [`seal_message`].
///
/// Whitespace between the marker and the payload is ignored.
///
/// # Errors
///
/// - `MalformedBlob` if the marker is missing, the payload is not base64, is
///   too short, or decrypts to invalid UTF-8
/// - `AuthenticationFailure` for a wrong key or a tampered envelope
pub fn open_message(envelope: &str, key: &RoomKey) -> Result<String, CryptoError> {
    let payload = envelope
        .strip_prefix(SECURE_MESSAGE_MARKER)
        .ok_or_else(|| CryptoError::malformed("missing secure message marker"))?
        .trim();

    let bytes =
        STANDARD.decode(payload).map_err(|e| CryptoError::malformed(format!("invalid base64: {e}")))?;
    let sealed = Sealed::from_bytes(&bytes)?;
    let plaintext = open(&sealed.nonce, &sealed.ciphertext, key.as_bytes())?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::malformed("message is not valid UTF-8"))
}
