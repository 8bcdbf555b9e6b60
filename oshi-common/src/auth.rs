//! Password hashing and session token generation
//!
//! Passwords are stored as Argon2id PHC strings (`$argon2id$v=19$...`). The
//! string carries its own salt and cost parameters, so a single column holds
//! everything needed to verify a login.
//!
//! This module contains ONLY pure functions. Session persistence lives in
//! [`crate::db::sessions`]; cookie handling lives in the web service.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use tracing::warn;

use crate::{Error, Result};

/// Random bytes per password salt
pub const SALT_BYTES: usize = 16;

/// Random bytes per session token (64 hex chars)
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a fresh random session token, hex encoded
pub fn generate_session_token() -> String {
    random_hex(SESSION_TOKEN_BYTES)
}

/// Hash a password with Argon2id and a fresh random salt
///
/// # Examples
///
/// ```
/// use oshi_common::auth::{hash_password, verify_password};
///
/// let hash = hash_password("password123").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("password123", &hash));
/// assert!(!verify_password("password124", &hash));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| Error::PasswordHash(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash string
///
/// A stored value that does not parse never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password_roundtrip() {
        let hash = hash_password("password123").unwrap();

        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("password123", &first));
        assert!(verify_password("password123", &second));
    }

    #[test]
    fn test_plaintext_never_stored() {
        let hash = hash_password("password123").unwrap();
        assert!(!hash.contains("password123"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_malformed_stored_hash_never_matches() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "pw"));

        // Legacy unsalted SHA-256 hex of "pw"
        assert!(!verify_password(
            "pw",
            "30c952fab122c3f9759f02a6d95c3758b246b4fee239957b2d4fee46e26170c4"
        ));
    }

    #[test]
    fn test_session_token_shape() {
        let token = generate_session_token();
        assert_eq!(token.len(), SESSION_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_non_ascii_password() {
        let hash = hash_password("パスワード").unwrap();
        assert!(verify_password("パスワード", &hash));
        assert!(!verify_password("パスワー", &hash));
    }
}
