//! Request field validation.
//!
//! Shape checks on registration and profile payloads, rendered through the
//! legacy `{ "error": ... }` envelope. Semantic rules (uniqueness, region
//! support) stay in the service layer.

use crate::error::{AppError, AppResult};

/// ## Errors
/// Returns a field validation error unless the login is 3-20 word characters.
pub fn validate_login(login: &str) -> AppResult<()> {
    let valid_chars = login.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if login.len() < 3 || login.len() > 20 || !valid_chars {
        return Err(AppError::FieldValidation(
            "Login must be 3-20 characters: letters, digits and underscore".to_owned(),
        ));
    }
    Ok(())
}

/// ## Errors
/// Returns a field validation error unless the username is 3-50 characters.
pub fn validate_username(username: &str) -> AppResult<()> {
    let trimmed = username.trim();
    if trimmed.len() < 3 || trimmed.len() > 50 {
        return Err(AppError::FieldValidation(
            "Username must be 3-50 characters".to_owned(),
        ));
    }
    Ok(())
}

/// ## Errors
/// Returns a field validation error for a malformed email address.
pub fn validate_email(email: &str) -> AppResult<()> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(AppError::FieldValidation(
            "Invalid email address".to_owned(),
        ));
    }
    Ok(())
}

/// ## Errors
/// Returns a field validation error unless the password is at least 8
/// characters with a letter and a digit.
pub fn validate_password(password: &str) -> AppResult<()> {
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if password.len() < 8 || !has_letter || !has_digit {
        return Err(AppError::FieldValidation(
            "Password must be at least 8 characters and contain a letter and a digit".to_owned(),
        ));
    }
    Ok(())
}
