//! Validation utilities.

use crate::{FieldError, TrackError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `TrackError` on failure.
    fn validate_request(&self) -> Result<(), TrackError> {
        self.validate().map_err(validation_errors_to_track_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect()
}

/// Converts `validator::ValidationErrors` to `TrackError`.
#[must_use]
pub fn validation_errors_to_track_error(errors: ValidationErrors) -> TrackError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    TrackError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(custom(function = "rules::not_blank"))]
        title: String,
    }

    #[test]
    fn test_valid_request_passes() {
        let probe = Probe {
            email: "a@x.com".to_string(),
            title: "Write docs".to_string(),
        };
        assert!(probe.validate_request().is_ok());
    }

    #[test]
    fn test_invalid_request_joins_messages() {
        let probe = Probe {
            email: "not-an-email".to_string(),
            title: "   ".to_string(),
        };
        let err = probe.validate_request().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("email: Invalid email format"));
        assert!(message.contains("title: not_blank"));
    }
}
