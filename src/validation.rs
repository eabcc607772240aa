//! Field validation for account registration and mutation.
//!
//! Invoked by the account service as an explicit step before persistence;
//! uniqueness is checked separately against the store.

use crate::models::account::is_email;
use crate::services::AccountError;

pub const USERNAME_MIN: usize = 4;
pub const USERNAME_MAX: usize = 32;
pub const EMAIL_MIN: usize = 4;
pub const EMAIL_MAX: usize = 127;

pub fn validate_username(username: &str) -> Result<&str, AccountError> {
    if username.is_empty() {
        return Err(AccountError::validation("Username cannot be empty"));
    }

    let length = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(AccountError::validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AccountError::validation(
            "Username can only contain letters, digits, hyphens, underscores, and dots",
        ));
    }

    Ok(username)
}

pub fn validate_email(email: &str) -> Result<&str, AccountError> {
    if email.is_empty() {
        return Err(AccountError::validation("Email cannot be empty"));
    }

    let length = email.chars().count();
    if !(EMAIL_MIN..=EMAIL_MAX).contains(&length) {
        return Err(AccountError::validation(format!(
            "Email must be between {EMAIL_MIN} and {EMAIL_MAX} characters"
        )));
    }

    if !is_email(email) {
        return Err(AccountError::validation("Email address is not valid"));
    }

    Ok(email)
}

pub fn validate_password(password: &str, min_length: usize) -> Result<&str, AccountError> {
    if password.is_empty() {
        return Err(AccountError::validation("Password cannot be empty"));
    }

    if password.chars().count() < min_length {
        return Err(AccountError::validation(format!(
            "Password must be at least {min_length} characters"
        )));
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("first.last_99").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("space man").is_err());
        assert!(validate_username("no@sign").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(127))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22", 6).is_ok());
        assert!(validate_password("short", 6).is_err());
        assert!(validate_password("", 6).is_err());
    }
}
