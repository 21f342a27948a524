//! Form checks run before any auth request leaves the process.

use crate::client::AppError;
use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// OTP codes are exactly four digits.
#[must_use]
pub fn valid_otp(code: &str) -> bool {
    Regex::new(r"^[0-9]{4}$").map_or(false, |re| re.is_match(code))
}

/// # Errors
/// Returns `AppError::Validation` describing the first problem found.
pub fn check_login(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required.".to_string(),
        ));
    }
    if !valid_email(email.trim()) {
        return Err(AppError::Validation("Invalid email address.".to_string()));
    }
    Ok(())
}

/// # Errors
/// Returns `AppError::Validation` describing the first problem found.
pub fn check_registration(name: &str, email: &str, password: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name is required.".to_string()));
    }
    check_login(email, password)?;
    check_password_strength(password)
}

/// # Errors
/// Returns `AppError::Validation` when the password is too short.
pub fn check_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// # Errors
/// Returns `AppError::Validation` when the fields are missing, too short or differ.
pub fn check_password_change(
    current: &str,
    new: &str,
    confirmation: &str,
) -> Result<(), AppError> {
    if current.is_empty() || new.is_empty() {
        return Err(AppError::Validation(
            "Current and new password are required.".to_string(),
        ));
    }
    check_password_strength(new)?;
    if new != confirmation {
        return Err(AppError::Validation("Passwords do not match.".to_string()));
    }
    Ok(())
}

/// # Errors
/// Returns `AppError::Validation` unless the code is four digits.
pub fn check_otp(code: &str) -> Result<(), AppError> {
    if valid_otp(code.trim()) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Please enter the 4-digit code.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(valid_email("ann@example.com"));
        assert!(!valid_email("ann@"));
        assert!(!valid_email("ann example.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn test_valid_otp() {
        assert!(valid_otp("0421"));
        assert!(!valid_otp("421"));
        assert!(!valid_otp("12345"));
        assert!(!valid_otp("12a4"));
    }

    #[test]
    fn test_check_login() {
        assert!(check_login("ann@x.com", "secret").is_ok());
        assert!(matches!(
            check_login("", "secret"),
            Err(AppError::Validation(_))
        ));
        assert!(check_login("ann@x.com", "").is_err());
    }

    #[test]
    fn test_check_registration() {
        assert!(check_registration("Ann", "ann@x.com", "secret").is_ok());
        assert!(check_registration(" ", "ann@x.com", "secret").is_err());
        assert!(check_registration("Ann", "ann@x.com", "12345").is_err());
    }

    #[test]
    fn test_check_password_change() {
        assert!(check_password_change("old", "newpass", "newpass").is_ok());
        assert_eq!(
            check_password_change("old", "newpass", "other1"),
            Err(AppError::Validation("Passwords do not match.".to_string()))
        );
        assert!(check_password_change("old", "short", "short").is_err());
    }
}
