// src/account/validators.rs

use regex::Regex;

use super::models::{PasswordResetConfirm, RegisterRequest};
use crate::common::{ValidationResult, Validator};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Loose email shape check; deliverability is proven by the mailed code
fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !is_valid_email(&data.email) {
            result.add_error("email", "Email must be a valid address");
        } else if data.email.len() > 255 {
            result.add_error("email", "Email must be less than 255 characters");
        }

        if data.password.len() < MIN_PASSWORD_LENGTH {
            result.add_error("password", "Password must be at least 8 characters long");
        }

        result
    }
}

pub struct PasswordResetConfirmValidator;

impl Validator<PasswordResetConfirm> for PasswordResetConfirmValidator {
    fn validate(&self, data: &PasswordResetConfirm) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !is_valid_email(&data.email) {
            result.add_error("email", "Email must be a valid address");
        }

        if data.code.trim().is_empty() {
            result.add_error("code", "Verification code is required");
        }

        if data.new_password.len() < MIN_PASSWORD_LENGTH {
            result.add_error(
                "new_password",
                "Password must be at least 8 characters long",
            );
        }

        result
    }
}
