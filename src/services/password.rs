//! Password hashing
//!
//! Argon2id hashing and verification. Hashes are stored in PHC string
//! format so the parameters and salt travel with the hash.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with the crate's default parameters.
///
/// Each call generates a fresh random salt, so hashing the same password
/// twice yields different strings.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// Returns `Ok(false)` for a mismatch; errors only when the stored hash
/// itself cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e))
            .context("Password verification error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id() {
        let hash = hash_password("secret123").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let first = hash_password("secret123").expect("Failed to hash password");
        let second = hash_password("secret123").expect("Failed to hash password");
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_roundtrip() {
        let hash = hash_password("secret123").expect("Failed to hash password");

        assert!(verify_password("secret123", &hash).expect("Verification errored"));
        assert!(!verify_password("wrong", &hash).expect("Verification errored"));
    }

    #[test]
    fn test_verify_invalid_hash_format() {
        assert!(verify_password("secret123", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let password = "pässwörd🥕";
        let hash = hash_password(password).expect("Failed to hash password");
        assert!(verify_password(password, &hash).expect("Verification errored"));
    }

    #[test]
    fn test_hash_does_not_leak_password() {
        let hash = hash_password("my_secret").expect("Failed to hash password");
        assert!(!hash.contains("my_secret"));
    }
}
