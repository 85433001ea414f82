// Password hashing and verification service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

use crate::auth::error::AuthError;
use crate::validation::{is_strong_enough_password, MIN_PASSWORD_LENGTH};

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a fresh random salt
    ///
    /// Returns the PHC-formatted string (algorithm, parameters, salt and hash).
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored hash
    ///
    /// Never fails on mismatch; an unparsable stored hash also verifies as false.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burn one verification against a fixed hash.
    ///
    /// Used when the account does not exist so both login failures cost the same.
    pub fn verify_against_dummy(password: &str) {
        static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

        let dummy = DUMMY_HASH.get_or_init(|| Self::hash_password("dummy-password-for-timing").ok());
        if let Some(hash) = dummy {
            let _ = Self::verify_password(password, hash);
        }
    }

    /// Validate password strength requirements
    pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
        if is_strong_enough_password(password) {
            Ok(())
        } else {
            Err(AuthError::PasswordTooShort(MIN_PASSWORD_LENGTH))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash_password("correct-horse-battery-staple").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordService::verify_password("correct-horse-battery-staple", &hash));
        assert!(!PasswordService::verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hash1 = PasswordService::hash_password("same-password").unwrap();
        let hash2 = PasswordService::hash_password("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(PasswordService::verify_password("same-password", &hash1));
        assert!(PasswordService::verify_password("same-password", &hash2));
    }

    #[test]
    fn test_garbage_hash_verifies_false() {
        assert!(!PasswordService::verify_password("password", "not-a-valid-hash"));
        assert!(!PasswordService::verify_password("password", ""));
    }

    #[test]
    fn test_hash_does_not_contain_plaintext() {
        let hash = PasswordService::hash_password("plaintext-secret").unwrap();
        assert!(!hash.contains("plaintext-secret"));
    }

    #[test]
    fn test_strength_policy() {
        assert!(PasswordService::validate_password_strength("longenough").is_ok());
        assert!(matches!(
            PasswordService::validate_password_strength("short"),
            Err(AuthError::PasswordTooShort(8))
        ));
    }

    proptest! {
        // Argon2 is deliberately slow; a handful of cases is enough
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_verify_accepts_only_the_hashed_password(
            password in "[ -~]{1,32}",
            other in "[ -~]{1,32}",
        ) {
            let hash = PasswordService::hash_password(&password)?;
            prop_assert!(PasswordService::verify_password(&password, &hash));
            if other != password {
                prop_assert!(!PasswordService::verify_password(&other, &hash));
            }
        }
    }
}
