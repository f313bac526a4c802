//! Common validation utilities.

use validator::ValidationError;

/// Minimum password length accepted by the identity provider.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Literal value a choice field takes when the free-text companion field applies.
pub const OTHER_CHOICE: &str = "Other";

/// Validates that a field holds a non-empty string.
pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a password meets the minimum length.
pub fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_length");
        err.message = Some(
            format!("Password must be at least {} characters.", MIN_PASSWORD_LENGTH).into(),
        );
        Err(err)
    }
}

/// Validates that a password and its confirmation are identical.
pub fn validate_passwords_match(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password == confirmation {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Passwords do not match.".into());
        Err(err)
    }
}

/// Validates a choice field paired with an "Other" free-text field.
///
/// When the choice is [`OTHER_CHOICE`] the free-text value must be filled in,
/// otherwise the free-text value is ignored.
pub fn validate_other_specified(
    code: &'static str,
    choice: &str,
    other: &str,
) -> Result<(), ValidationError> {
    if choice == OTHER_CHOICE && other.is_empty() {
        let mut err = ValidationError::new(code);
        err.message = Some("Please specify a value when \"Other\" is selected".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Acme").is_ok());
        assert!(validate_required(" ").is_ok());
        assert!(validate_required("").is_err());
    }

    #[test]
    fn test_validate_required_error_code() {
        let err = validate_required("").unwrap_err();
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password_length("secret1").is_ok());
        assert!(validate_password_length("123456").is_ok());
        assert!(validate_password_length("12345").is_err());
        assert!(validate_password_length("").is_err());
    }

    #[test]
    fn test_validate_password_length_error_message() {
        let err = validate_password_length("abc").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Password must be at least 6 characters."
        );
    }

    #[test]
    fn test_validate_passwords_match() {
        assert!(validate_passwords_match("secret1", "secret1").is_ok());
        let err = validate_passwords_match("secret1", "secret2").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Passwords do not match.");
    }

    #[test]
    fn test_validate_other_specified() {
        assert!(validate_other_specified("job_title_other", "CEO", "").is_ok());
        assert!(validate_other_specified("job_title_other", "Other", "Founder").is_ok());
        let err = validate_other_specified("job_title_other", "Other", "").unwrap_err();
        assert_eq!(err.code, "job_title_other");
    }

    #[test]
    fn test_validate_other_specified_is_case_sensitive() {
        assert!(validate_other_specified("industry_other", "other", "").is_ok());
    }
}
