//! Argon2 password hashing
//!
//! Hashing and verification run under `spawn_blocking` because Argon2 is
//! CPU-intensive and would stall the async runtime if run inline.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task;

use crate::common::ApiError;

/// Hash a plaintext password into a PHC-format string
pub async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| ApiError::InternalServer(format!("password hashing task panicked: {}", e)))?
}

/// Verify a plaintext password against a stored PHC-format hash
///
/// An unparseable stored hash counts as a failed verification rather than an
/// internal error, so a corrupt row cannot be used to probe the system.
pub async fn verify_password(stored_hash: &str, password: &str) -> Result<bool, ApiError> {
    let stored_hash = stored_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let Ok(parsed_hash) = PasswordHash::new(&stored_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    })
    .await
    .map_err(|e| ApiError::InternalServer(format!("password verification task panicked: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").await.unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password(&hash, "correct horse battery staple")
            .await
            .unwrap());
        assert!(!verify_password(&hash, "wrong password").await.unwrap());
    }

    #[tokio::test]
    async fn test_garbage_hash_fails_closed() {
        assert!(!verify_password("not-a-phc-string", "anything")
            .await
            .unwrap());
    }
}
