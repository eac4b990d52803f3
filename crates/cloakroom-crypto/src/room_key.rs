//! The shared room secret.

use std::fmt;

use cloakroom_core::Environment;
use zeroize::Zeroize;

use crate::{aead::KEY_SIZE, error::CryptoError};

/// 256-bit symmetric key shared by everyone in a room.
///
/// Never leaves the process unwrapped. Key material is zeroized on drop and
/// redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct RoomKey([u8; KEY_SIZE]);

impl RoomKey {
    /// Draw a fresh random room key.
    pub fn generate(env: &impl Environment) -> Self {
        Self(env.random_array())
    }

    /// Wrap existing key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy key bytes out of a slice.
    ///
    /// # Errors
    ///
    /// - `MalformedBlob` if the slice is not exactly `KEY_SIZE` bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::malformed(format!(
                "room key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RoomKey(<redacted>)")
    }
}

impl Drop for RoomKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
