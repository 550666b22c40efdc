//! Request validation utilities.

use validator::ValidationError;

/// Creates a validation error with a user-facing message.
pub fn validation_error(code: &'static str, message: &str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.to_string().into());
    error
}

/// Rejects strings that are empty or contain only whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "must not be empty or whitespace"));
    }

    Ok(())
}
