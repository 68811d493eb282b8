use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::errors::AppError;

/// Hashes a plaintext password into an Argon2 PHC string.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// Verifies a plaintext password against a stored PHC string.
/// A malformed stored hash verifies as false rather than erroring — the
/// caller collapses every failure into the same generic outcome anyway.
pub fn verify_password(plain: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_two_hashes_of_same_password_differ() {
        let a = hash_password("same-input").unwrap();
        let b = hash_password("same-input").unwrap();
        assert_ne!(a, b); // per-hash random salt
    }

    #[test]
    fn test_malformed_stored_hash_is_false_not_panic() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}
