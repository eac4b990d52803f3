//! Room code generation.

use cloakroom_core::Environment;
use cloakroom_proto::{GENERATED_CODE_LEN, ROOM_CODE_ALPHABET, RoomCode};

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above it are rejected so every symbol is equally likely.
const REJECTION_BOUND: u8 = (256 / ROOM_CODE_ALPHABET.len() * ROOM_CODE_ALPHABET.len()) as u8;

/// Generate an 8-character code from `[A-Z0-9]`.
///
/// Eight independent uniform draws from the environment's secure RNG. No
/// check against existing relay slots is made; the 36^8 space makes
/// collisions unlikely, not impossible.
pub fn generate_room_code(env: &impl Environment) -> RoomCode {
    let mut indices = [0u8; GENERATED_CODE_LEN];
    let mut filled = 0;

    while filled < GENERATED_CODE_LEN {
        let batch: [u8; 16] = env.random_array();
        for byte in batch.into_iter().filter(|&b| b < REJECTION_BOUND) {
            if filled == GENERATED_CODE_LEN {
                break;
            }
            indices[filled] = byte % ROOM_CODE_ALPHABET.len() as u8;
            filled += 1;
        }
    }

    RoomCode::from_alphabet_indices(indices)
}
