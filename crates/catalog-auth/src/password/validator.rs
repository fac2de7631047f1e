//! Password policy enforcement for new passwords.

use catalog_core::config::AuthConfig;
use catalog_core::error::{AppError, FieldError};

/// Validates password strength against the configured policy: a minimum
/// length plus at least one uppercase letter, one lowercase letter and one
/// digit.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Every policy violation, in a fixed order.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();
        if password.chars().count() < self.min_length {
            problems.push(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }
        let has_upper = password.chars().any(char::is_uppercase);
        let has_lower = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !(has_upper && has_lower && has_digit) {
            problems.push(
                "Password must contain at least one uppercase letter, one lowercase letter, and one number"
                    .to_string(),
            );
        }
        problems
    }

    /// Validates a password, reporting violations against the `password` field.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let problems = self.violations(password);
        if problems.is_empty() {
            return Ok(());
        }
        Err(AppError::validation_fields(
            "Validation failed",
            problems
                .into_iter()
                .map(|message| FieldError::new("password", message))
                .collect(),
        ))
    }
}
