//! Server error types.

use std::fmt;

/// Errors that stop the relay from starting or keep it from running.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (unparseable bind address, zero TTL, etc.).
    ///
    /// Fatal. Fix configuration and restart.
    Config(String),

    /// Transport/network error (bind failure, accept loop I/O error).
    ///
    /// May be transient or fatal (address in use). Check the message.
    Transport(String),

    /// Internal error (background task panicked, etc.).
    ///
    /// Indicates a bug.
    Internal(String),
}

impl ServerError {
    /// Whether the relay should not be restarted with the same settings.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Internal(_))
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_transport() {
        let err = ServerError::from(std::io::Error::other("address in use"));
        assert_eq!(err.to_string(), "transport error: address in use");
        assert!(!err.is_fatal());
    }

    #[test]
    fn config_errors_are_fatal() {
        assert!(ServerError::Config("room TTL must be positive".into()).is_fatal());
    }
}
