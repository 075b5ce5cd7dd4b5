//! Password hashing.
//!
//! Passwords are stored as Argon2id PHC strings. An account created
//! without a password gets an unusable marker that never verifies.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};

/// Prefix of passwords that can never be used to log in.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Errors from hashing a password.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

/// Argon2id password hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self
    }

    /// Encode a password for storage.
    ///
    /// `None` produces the unusable marker.
    pub fn hash(&self, password: Option<&str>) -> Result<String, PasswordError> {
        let Some(password) = password else {
            return Ok(UNUSABLE_PASSWORD_PREFIX.to_string());
        };

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError(e.to_string()))
    }

    /// Check a password against a stored encoding.
    ///
    /// Unusable and malformed encodings never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        if !is_usable(encoded) {
            return false;
        }
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Whether the encoding can ever verify.
pub fn is_usable(encoded: &str) -> bool {
    !encoded.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// Short description of a stored encoding for read-only display.
///
/// Shows the algorithm and parameters, never the hash itself.
pub fn describe(encoded: &str) -> String {
    if !is_usable(encoded) {
        return "No password set.".to_string();
    }
    match PasswordHash::new(encoded) {
        Ok(parsed) => format!("algorithm: {} params: {}", parsed.algorithm, parsed.params),
        Err(_) => "Invalid password format or unknown hashing algorithm.".to_string(),
    }
}
