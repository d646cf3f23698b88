//! Account field normalization and validation.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length of a display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Minimum password length for credential accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Normalize an email address for storage and lookup (trim + lowercase).
///
/// Emails are stored lower-case so the unique index and the ban list agree
/// regardless of how the user typed the address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an (already normalized) email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation("Invalid email address".into()));
    }
    Ok(())
}

/// Validate a display name (non-blank, <= 100 chars).
pub fn validate_display_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate that a password meets minimum strength requirements.
///
/// Requires the minimum length and at least one letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(CoreError::Validation(
            "Password must contain at least one letter and one digit".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Amina@Example.COM "), "amina@example.com");
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("amina@example.com").is_ok());
        assert_matches!(validate_email("not-an-email"), Err(CoreError::Validation(_)));
        assert_matches!(validate_email(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_name_rejected() {
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name("Yusuf").is_ok());
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        // 100 Arabic letters are 200 bytes but still within the limit.
        let name: String = std::iter::repeat('ع').take(MAX_NAME_LENGTH).collect();
        assert!(validate_display_name(&name).is_ok());
        let too_long: String = std::iter::repeat('a').take(MAX_NAME_LENGTH + 1).collect();
        assert!(validate_display_name(&too_long).is_err());
    }

    #[test]
    fn password_rules() {
        let err = validate_password_strength("short1").unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));
        assert!(validate_password_strength("lettersonly").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("patience786").is_ok());
    }
}
