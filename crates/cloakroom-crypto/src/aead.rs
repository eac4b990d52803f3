//! Authenticated encryption using AES-256-GCM
//!
//! The single place that touches the AEAD. Key wrapping and message envelopes
//! are both layouts built on [`seal`] and [`open`].

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use cloakroom_core::Environment;

use crate::error::CryptoError;

/// AES-256 key size (256 bits)
pub const KEY_SIZE: usize = 32;

/// GCM nonce size (96 bits)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size (128 bits)
pub const TAG_SIZE: usize = 16;

/// Output of a single [`seal`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Nonce drawn for this encryption
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the 16-byte tag appended
    pub ciphertext: Vec<u8>,
}

impl Sealed {
    /// Serialize as `nonce ‖ ciphertext ‖ tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split `nonce ‖ ciphertext ‖ tag`.
    ///
    /// # Errors
    ///
    /// - `MalformedBlob` if the input cannot hold a nonce and a tag
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::malformed(format!(
                "envelope is {} bytes, need at least {}",
                bytes.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce);

        Ok(Self { nonce: nonce_bytes, ciphertext: ciphertext.to_vec() })
    }

    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }
}

/// Encrypt `plaintext` under `key` with a freshly drawn nonce.
///
/// # Security
///
/// - One random draw per call; a nonce is never reused deliberately
/// - The environment MUST provide cryptographically secure randomness in
///   production
pub fn seal(
    plaintext: &[u8],
    key: &[u8; KEY_SIZE],
    env: &impl Environment,
) -> Result<Sealed, CryptoError> {
    let nonce: [u8; NONCE_SIZE] = env.random_array();
    let cipher = Aes256Gcm::new(key.into());

    let ciphertext =
        cipher.encrypt(Nonce::from_slice(&nonce), plaintext).map_err(|_| CryptoError::SealFailed)?;

    Ok(Sealed { nonce, ciphertext })
}

/// Decrypt and verify `ciphertext` (tag appended) under `key`.
///
/// # Errors
///
/// - `AuthenticationFailure` if the tag does not verify for any reason
pub fn open(
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    key: &[u8; KEY_SIZE],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(key.into());

    cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| CryptoError::AuthenticationFailure)
}
