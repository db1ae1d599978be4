/// Password Hashing and Verification
///
/// bcrypt with a fixed work factor. Every hash carries its own random salt,
/// so hashing the same password twice yields two different strings.

use bcrypt::{hash, verify};
use std::sync::Arc;

use crate::error::{AppError, ConfigError};

/// Production work factor
pub const DEFAULT_HASH_COST: u32 = 14;

const TIMING_DUMMY_PASSWORD: &str = "timing-equalisation-only";

#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Verified against when the account does not exist, so that path costs
    // the same as a wrong password.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Build a hasher for the given bcrypt cost.
    ///
    /// # Errors
    /// Returns a config error if bcrypt rejects the cost.
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash(TIMING_DUMMY_PASSWORD, cost).map_err(|e| {
            ConfigError::InvalidValue(format!("password hash cost {}: {}", cost, e))
        })?;

        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password.
    ///
    /// # Errors
    /// Any bcrypt failure aborts the calling operation.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check `candidate` against `stored_hash` in constant time.
    ///
    /// A malformed stored hash is a mismatch, not an error.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> bool {
        match verify(candidate, stored_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// Spend one verification worth of time and report a mismatch.
    pub fn verify_dummy(&self, candidate: &str) -> bool {
        let _ = verify(candidate, &self.dummy_hash);
        false
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").field("cost", &self.cost).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4).expect("Failed to build hasher")
    }

    #[test]
    fn test_hash_password() {
        let password = "secret123";
        let hash = hasher().hash(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("secret123").expect("Failed to hash password");

        assert!(hasher.verify(&hash, "secret123"));
        assert!(!hasher.verify(&hash, "secret124"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = hasher();
        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "secret123"));
        assert!(hasher.verify(&second, "secret123"));
    }

    #[test]
    fn test_malformed_stored_hash_is_mismatch() {
        let hasher = hasher();

        assert!(!hasher.verify("not-a-bcrypt-hash", "secret123"));
        assert!(!hasher.verify("", "secret123"));
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        let hasher = hasher();

        assert!(!hasher.verify_dummy(TIMING_DUMMY_PASSWORD));
        assert!(!hasher.verify_dummy("anything"));
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        assert!(matches!(
            PasswordHasher::new(2),
            Err(AppError::Config(ConfigError::InvalidValue(_)))
        ));
        assert!(PasswordHasher::new(40).is_err());
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(DEFAULT_HASH_COST, 14);
        assert_eq!(hasher().cost(), 4);
    }
}
