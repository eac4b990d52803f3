//! Human-shareable room identifiers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbols a generated room code is drawn from.
pub const ROOM_CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of codes produced by the generator.
pub const GENERATED_CODE_LEN: usize = 8;

/// Shortest code the relay accepts.
pub const MIN_CODE_LEN: usize = 8;

/// Longest code the relay accepts.
pub const MAX_CODE_LEN: usize = 12;

/// Rejected room code input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    /// Code is shorter or longer than the accepted range
    #[error("room code must be {MIN_CODE_LEN}-{MAX_CODE_LEN} characters, got {0}")]
    InvalidLength(usize),

    /// Code contains something other than ASCII letters and digits
    #[error("room code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A validated, upper-case room code.
///
/// # Invariants
///
/// - Length is within `MIN_CODE_LEN..=MAX_CODE_LEN`
/// - Every character is in `[A-Z0-9]`
///
/// Parsing is case-insensitive; the stored form is always upper-case so
/// `abcdefgh` and `ABCDEFGH` address the same relay slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Validate and normalize a room code.
    pub fn parse(input: &str) -> Result<Self, RoomCodeError> {
        let len = input.chars().count();
        if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&len) {
            return Err(RoomCodeError::InvalidLength(len));
        }

        if let Some(bad) = input.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(RoomCodeError::InvalidCharacter(bad));
        }

        Ok(Self(input.to_ascii_uppercase()))
    }

    /// Build a code from alphabet indices.
    ///
    /// Each index is reduced modulo the alphabet size, so any byte source
    /// produces a valid code. Callers are responsible for unbiased indices.
    pub fn from_alphabet_indices(indices: [u8; GENERATED_CODE_LEN]) -> Self {
        let code = indices
            .iter()
            .map(|&i| char::from(ROOM_CODE_ALPHABET[usize::from(i) % ROOM_CODE_ALPHABET.len()]))
            .collect();
        Self(code)
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RoomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_to_upper_case() {
        let code = RoomCode::parse("abcd1234").unwrap();
        assert_eq!(code.as_str(), "ABCD1234");
        assert_eq!(code, RoomCode::parse("ABCD1234").unwrap());
    }

    #[test]
    fn parse_accepts_length_bounds() {
        assert!(RoomCode::parse("ABCDEFGH").is_ok());
        assert!(RoomCode::parse("ABCDEFGH1234").is_ok());
        assert_eq!(RoomCode::parse("ABCDEFG"), Err(RoomCodeError::InvalidLength(7)));
        assert_eq!(RoomCode::parse("ABCDEFGH12345"), Err(RoomCodeError::InvalidLength(13)));
        assert_eq!(RoomCode::parse(""), Err(RoomCodeError::InvalidLength(0)));
    }

    #[test]
    fn parse_rejects_non_alphanumeric() {
        assert_eq!(RoomCode::parse("bad code!"), Err(RoomCodeError::InvalidCharacter(' ')));
        assert_eq!(RoomCode::parse("ABCD-EFGH"), Err(RoomCodeError::InvalidCharacter('-')));
        // Non-ASCII letters are alphanumeric for `char` but not for the relay
        assert_eq!(RoomCode::parse("ÄBCDEFGH"), Err(RoomCodeError::InvalidCharacter('Ä')));
    }

    #[test]
    fn from_alphabet_indices_wraps() {
        let code = RoomCode::from_alphabet_indices([0, 25, 26, 35, 36, 61, 62, 255]);
        assert_eq!(code.as_str(), "AZ09AZ0D");
        assert!(RoomCode::parse(code.as_str()).is_ok());
    }

    #[test]
    fn error_display() {
        let err = RoomCodeError::InvalidLength(5);
        assert_eq!(err.to_string(), "room code must be 8-12 characters, got 5");
    }
}
