//! Passphrase key derivation using PBKDF2-HMAC-SHA256

use sha2::Sha256;
use zeroize::Zeroizing;

use crate::aead::KEY_SIZE;

/// PBKDF2 iteration count.
///
/// Every unwrap attempt against a captured blob costs an attacker this many
/// HMAC-SHA256 evaluations per passphrase guess.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Size of the random salt stored in front of every wrapped blob (128 bits)
pub const SALT_SIZE: usize = 16;

/// Derive a 256-bit wrapping key from a passphrase and salt.
///
/// Deterministic: the same passphrase and salt always give the same key. The
/// passphrase is used as raw UTF-8 bytes with no normalization. The returned
/// key is zeroized on drop.
pub fn derive_wrapping_key(passphrase: &str, salt: &[u8; SALT_SIZE]) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut key[..]);
    key
}
