//! Password hashing and verification using bcrypt

use crate::core::error::{RailError, Result};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| RailError::AuthenticationError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| RailError::AuthenticationError(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("p1").unwrap();
        assert_ne!(hash, "p1");
        assert!(verify_password("p1", &hash).unwrap());
        assert!(!verify_password("p2", &hash).unwrap());
    }
}
