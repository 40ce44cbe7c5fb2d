//! Account lifecycle data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pending registration or password-reset credential
///
/// Keyed by email: at most one live code per address. For registration the
/// pending password hash is stored here until the code is confirmed; the
/// plaintext password never touches the database.
#[derive(FromRow, Debug, Clone)]
pub struct VerificationCode {
    pub email: String,
    pub code: String,
    pub password_hash: String,
    pub expires_at: String,
}

/// Registration request body
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Code confirmation body shared by registration verification
#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// Password reset request body
#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Password reset confirmation body
#[derive(Deserialize)]
pub struct PasswordResetConfirm {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Generic `{message}` response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
