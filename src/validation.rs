// Validation utilities module
// Custom validator functions for domain-specific rules

use validator::ValidationError;

use crate::tasks::models::TaskStatus;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Rejects empty or whitespace-only text
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Accepts one of the task status values; empty text means "use the default"
pub fn validate_task_status(status: &str) -> Result<(), ValidationError> {
    if status.is_empty() || TaskStatus::from_str(status).is_ok() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_status");
        error.message = Some("status must be pending, in_progress, or completed".into());
        error.add_param("value".into(), &status);
        Err(error)
    }
}

/// Validates that an email address is structurally plausible
pub fn is_valid_email(email: &str) -> bool {
    validator::validate_email(email)
}

/// Validates the password length policy
pub fn is_strong_enough_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("title").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t\n").is_err());
    }

    #[test]
    fn test_task_status() {
        assert!(validate_task_status("pending").is_ok());
        assert!(validate_task_status("in_progress").is_ok());
        assert!(validate_task_status("completed").is_ok());
        assert!(validate_task_status("").is_ok());
        assert!(validate_task_status("bogus").is_err());
        assert!(validate_task_status("Pending").is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_length_policy() {
        assert!(is_strong_enough_password("12345678"));
        assert!(!is_strong_enough_password("1234567"));
        assert!(!is_strong_enough_password(""));
    }
}
