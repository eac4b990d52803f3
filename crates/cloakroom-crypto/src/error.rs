//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from wrapping, unwrapping and message envelopes.
///
/// Every variant is terminal for the operation that produced it: retrying
/// with the same inputs cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Authentication tag did not verify.
    ///
    /// Wrong passphrase, wrong room key, or tampered/corrupted ciphertext.
    /// The causes are deliberately indistinguishable.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Input could not be decoded or is too short for its layout
    #[error("malformed blob: {reason}")]
    MalformedBlob {
        /// What was wrong with the input
        reason: String,
    },

    /// The AEAD refused to encrypt (plaintext exceeds the GCM limit)
    #[error("seal failed")]
    SealFailed,
}

impl CryptoError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedBlob { reason: reason.into() }
    }

    /// Returns true if the failure came from tag verification.
    ///
    /// On join this is surfaced as "wrong passphrase or room expired".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailure)
    }
}
