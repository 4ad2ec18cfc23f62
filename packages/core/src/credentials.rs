//! Credential collaborator: salt generation, password hashing, and the
//! password-strength gate.
//!
//! The rest of the scheduler only ever calls [`generate_salt`],
//! [`hash_password`], [`verify_password`], and [`check_strength`]. Raw
//! passwords are never stored or inspected beyond these functions.

use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::SchedulerError;

/// Length of the per-account random salt in bytes.
pub const SALT_LEN: usize = 16;

/// Iteration count for the salted hash. Keyed stretching is overkill for a
/// teaching scheduler, but a single unsalted digest would be wrong enough
/// to matter.
const HASH_ROUNDS: u32 = 10_000;

/// Characters accepted as the required special character.
const SPECIAL_CHARS: &[char] = &['!', '@', '#', '?'];

/// Generate a fresh random salt from the OS entropy source.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Iterated salted SHA-256 of `password`.
pub fn hash_password(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..HASH_ROUNDS {
        digest = Sha256::new().chain_update(salt).chain_update(digest).finalize();
    }
    digest.to_vec()
}

/// Constant-time comparison of a freshly computed hash against the stored one.
pub fn verify_password(password: &str, salt: &[u8], stored: &[u8]) -> bool {
    constant_time_eq(&hash_password(password, salt), stored)
}

/// Password-strength gate applied at registration: at least 8 characters,
/// mixed case, a digit, and one of `! @ # ?`.
pub fn check_strength(password: &str) -> Result<(), SchedulerError> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(&c));

    if long_enough && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(SchedulerError::WeakPassword)
    }
}
