//! Strength policy for newly chosen passwords.

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

/// Rejects short or low-entropy passwords.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Validator using `auth.password_min_length`.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Check a candidate password.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, &[]);
        if estimate.score() < zxcvbn::Score::Three {
            return Err(AppError::validation(
                "Password is too weak; choose a longer or less predictable one",
            ));
        }

        Ok(())
    }

    /// The replacement must differ from the current password.
    pub fn validate_not_same(&self, current: &str, replacement: &str) -> AppResult<()> {
        if current == replacement {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_short_password_rejected() {
        let err = validator().validate("aB3$").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("at least 8"));
    }

    #[test]
    fn test_weak_password_rejected() {
        assert!(validator().validate("password").is_err());
        assert!(validator().validate("12345678").is_err());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(validator().validate("tangerine-Orbit-42-quietly").is_ok());
    }

    #[test]
    fn test_same_password_rejected() {
        assert!(validator().validate_not_same("a", "a").is_err());
        assert!(validator().validate_not_same("a", "b").is_ok());
    }
}
