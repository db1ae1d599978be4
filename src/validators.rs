/// Input validators for signup and login bodies
/// - Length limits on every field (DoS protection)
/// - Email and phone format checks
/// - Password length bounded by what bcrypt actually hashes

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PHONE_LENGTH: usize = 7;
const MAX_PHONE_LENGTH: usize = 20;
const MIN_PASSWORD_LENGTH: usize = 6;
// bcrypt ignores input past 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).expect("email regex is valid");

    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()\-]+$").expect("phone regex is valid");
}

/// Validates an email address and returns it trimmed.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }
    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }
    // Local part is limited to 64 octets
    if trimmed.split('@').next().map_or(0, str::len) > 64 {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates a first or last name and returns it trimmed.
pub fn is_valid_name(field: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if length < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort(field, MIN_NAME_LENGTH));
    }
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong(field, MAX_NAME_LENGTH));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat(field));
    }

    Ok(trimmed.to_string())
}

/// Validates a phone number and returns it trimmed.
pub fn is_valid_phone(phone: &str) -> Result<String, ValidationError> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("phone"));
    }
    if trimmed.len() < MIN_PHONE_LENGTH {
        return Err(ValidationError::TooShort("phone", MIN_PHONE_LENGTH));
    }
    if trimmed.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong("phone", MAX_PHONE_LENGTH));
    }
    if !PHONE_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("phone"));
    }

    Ok(trimmed.to_string())
}

/// Validates a plaintext password. Passwords are never trimmed.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        let valid = vec!["a@x.com", "john.doe@example.co.uk", "  padded@example.org  "];
        for email in valid {
            assert!(is_valid_email(email).is_ok(), "expected valid: {}", email);
        }
        assert_eq!(is_valid_email("  a@x.com ").unwrap(), "a@x.com");
    }

    #[test]
    fn test_invalid_emails() {
        let invalid = vec!["", "notanemail", "user@", "@example.com", "user@@example.com", "a@b"];
        for email in invalid {
            assert!(is_valid_email(email).is_err(), "expected invalid: {}", email);
        }
    }

    #[test]
    fn test_email_local_part_too_long() {
        let email = format!("{}@example.com", "a".repeat(65));
        assert_eq!(
            is_valid_email(&email),
            Err(ValidationError::InvalidFormat("email"))
        );
    }

    #[test]
    fn test_name_bounds() {
        assert_eq!(is_valid_name("first_name", "Al").unwrap(), "Al");
        assert_eq!(
            is_valid_name("first_name", "A"),
            Err(ValidationError::TooShort("first_name", MIN_NAME_LENGTH))
        );
        assert_eq!(
            is_valid_name("last_name", &"b".repeat(101)),
            Err(ValidationError::TooLong("last_name", MAX_NAME_LENGTH))
        );
        assert_eq!(
            is_valid_name("last_name", "   "),
            Err(ValidationError::EmptyField("last_name"))
        );
        assert!(is_valid_name("first_name", "Bad\u{0007}Name").is_err());
    }

    #[test]
    fn test_phone_formats() {
        assert!(is_valid_phone("+1 (555) 123-4567").is_ok());
        assert!(is_valid_phone("5551234").is_ok());
        assert!(is_valid_phone("555-12").is_err());
        assert!(is_valid_phone("call me maybe").is_err());
        assert!(is_valid_phone("").is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(is_valid_password("secret123").is_ok());
        assert_eq!(
            is_valid_password("short"),
            Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH))
        );
        assert_eq!(
            is_valid_password(&"p".repeat(73)),
            Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH))
        );
        assert_eq!(is_valid_password(""), Err(ValidationError::EmptyField("password")));
    }
}
