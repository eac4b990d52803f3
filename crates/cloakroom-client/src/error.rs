//! Client error types.

use cloakroom_crypto::CryptoError;
use cloakroom_proto::RoomCodeError;
use thiserror::Error;

/// Errors from room create/join flows and message enveloping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No relay URL is configured
    #[error("relay URL is not configured")]
    NotConfigured,

    /// Room code was rejected locally before any request was made
    #[error("invalid room code: {0}")]
    InvalidRoomCode(#[from] RoomCodeError),

    /// Relay rejected the request as malformed (HTTP 400)
    #[error("relay rejected request: {reason}")]
    InvalidRequest {
        /// Error text returned by the relay
        reason: String,
    },

    /// Room code has no live record at the relay (HTTP 404)
    #[error("room not found or expired")]
    NotFound,

    /// Per-client lookup quota exceeded (HTTP 429)
    #[error("rate limited by relay")]
    RateLimited,

    /// The transport could not reach the relay
    #[error("transport failure: {reason}")]
    TransportFailure {
        /// Diagnostic string from the transport
        reason: String,
    },

    /// Relay answered with a status outside the protocol
    #[error("unexpected relay status {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: i32,
    },

    /// Relay response body did not match the wire format
    #[error("protocol error: {reason}")]
    Protocol {
        /// What failed to parse
        reason: String,
    },

    /// Key unwrapping or message enveloping failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ClientError {
    /// Text suitable for showing to the end user.
    ///
    /// Authentication and decoding failures do not say whether the
    /// passphrase or the stored blob was at fault. A failed seal is reported
    /// as a send failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => "Relay URL not configured. Please set it in settings.".to_string(),
            Self::InvalidRoomCode(_) => "Invalid room code".to_string(),
            Self::InvalidRequest { reason } => reason.clone(),
            Self::NotFound => "Room not found or expired".to_string(),
            Self::RateLimited => "Too many attempts. Please try again later.".to_string(),
            Self::TransportFailure { .. } => {
                "Could not reach the relay. Check your connection.".to_string()
            },
            Self::UnexpectedStatus { status } => format!("Relay error (status {status})"),
            Self::Protocol { .. } => "Unexpected response from relay".to_string(),
            Self::Crypto(CryptoError::SealFailed) => {
                "Encryption failed. The message was not sent.".to_string()
            },
            Self::Crypto(CryptoError::AuthenticationFailure | CryptoError::MalformedBlob { .. }) => {
                "Wrong passphrase or room expired".to_string()
            },
        }
    }

    /// Whether repeating the same call later could succeed.
    ///
    /// Cryptographic failures are terminal: the same inputs fail the same
    /// way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::TransportFailure { .. } | Self::UnexpectedStatus { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages() {
        insta::assert_snapshot!(ClientError::NotFound.user_message(), @"Room not found or expired");
        insta::assert_snapshot!(
            ClientError::RateLimited.user_message(),
            @"Too many attempts. Please try again later."
        );
        insta::assert_snapshot!(
            ClientError::Crypto(CryptoError::AuthenticationFailure).user_message(),
            @"Wrong passphrase or room expired"
        );
        insta::assert_snapshot!(
            ClientError::TransportFailure { reason: "dns".into() }.user_message(),
            @"Could not reach the relay. Check your connection."
        );
    }

    #[test]
    fn seal_failure_is_not_blamed_on_the_passphrase() {
        insta::assert_snapshot!(
            ClientError::Crypto(CryptoError::SealFailed).user_message(),
            @"Encryption failed. The message was not sent."
        );
        insta::assert_snapshot!(
            ClientError::Crypto(CryptoError::MalformedBlob { reason: "too short".into() })
                .user_message(),
            @"Wrong passphrase or room expired"
        );
    }

    #[test]
    fn relay_reason_is_shown_verbatim() {
        let err = ClientError::InvalidRequest { reason: "Invalid room code".into() };
        assert_eq!(err.user_message(), "Invalid room code");
    }

    #[test]
    fn crypto_errors_are_terminal() {
        assert!(!ClientError::Crypto(CryptoError::AuthenticationFailure).is_retryable());
        assert!(!ClientError::NotFound.is_retryable());
        assert!(ClientError::RateLimited.is_retryable());
        assert!(ClientError::TransportFailure { reason: String::new() }.is_retryable());
    }
}
