//! Credential Verifier: Argon2id password hashing and verification.
//!
//! Hashes are stored in PHC string format so the algorithm parameters and
//! salt travel with the digest. A fresh salt is drawn from [`OsRng`] for
//! every hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::CoreError;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A well-formed Argon2id digest with the default cost parameters that no
/// password produces. Checked on login misses so an unknown identity costs
/// the same hashing work as a wrong password.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Only fails if the entropy source or the hasher itself fails; callers
/// treat that as an internal error and do not retry.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Never errors: a mismatch is `false`, and so is a digest that does not
/// parse as a PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Validate that a password meets minimum strength requirements.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");

        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("real-password").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_salts_differ_per_hash() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b, "each hash must carry its own salt");
    }

    #[test]
    fn test_malformed_digest_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_dummy_hash_parses_with_default_cost() {
        let parsed = PasswordHash::new(DUMMY_PASSWORD_HASH).expect("dummy must be a PHC string");
        let params = argon2::Params::try_from(&parsed).expect("dummy must carry argon2 params");
        assert_eq!(params.m_cost(), argon2::Params::DEFAULT_M_COST);
        assert_eq!(params.t_cost(), argon2::Params::DEFAULT_T_COST);
        assert_eq!(params.p_cost(), argon2::Params::DEFAULT_P_COST);

        for candidate in ["", "pw123456", "password"] {
            assert!(!verify_password(candidate, DUMMY_PASSWORD_HASH));
        }
    }

    #[test]
    fn test_password_too_short() {
        let err = validate_password_strength("short", MIN_PASSWORD_LENGTH).unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));
    }

    #[test]
    fn test_password_meets_minimum() {
        assert!(validate_password_strength("pw123456", MIN_PASSWORD_LENGTH).is_ok());
        assert!(validate_password_strength("a-much-longer-password", MIN_PASSWORD_LENGTH).is_ok());
    }
}
