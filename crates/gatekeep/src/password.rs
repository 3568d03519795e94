//! Password hashing and verification using Argon2.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use password_hash::rand_core::OsRng;

use crate::error::{AuthError, Result};

/// Hashes a password using Argon2id with the default cost parameters.
///
/// Returns the hashed password as a PHC string that includes the salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::HashingFailure)?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash.
///
/// A stored value that is not a parseable hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::VerificationFailed)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("test").unwrap();

        assert!(verify_password("test", &hash).is_ok());
        assert!(matches!(
            verify_password("test1", &hash),
            Err(AuthError::VerificationFailed)
        ));
    }

    #[test]
    fn test_salted_hashes_differ() {
        let hash1 = hash_password("test").unwrap();
        let hash2 = hash_password("test").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("test", &hash1).is_ok());
        assert!(verify_password("test", &hash2).is_ok());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(verify_password("", "").is_err());
        assert!(verify_password("test", "test").is_err());
    }
}
