//! Input validation glue.
//!
//! Request DTOs derive [`validator::Validate`]; handlers call [`validate`]
//! so field errors surface as [`CoreError::Validation`].

use validator::Validate;

use crate::error::CoreError;

/// Run derived validation rules on `input`.
pub fn validate<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(errors.to_string()))
}

/// Reject a blank required string. Used where derive attributes cannot
/// express the rule (values assembled in handlers).
pub fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Custom `validator` rule: string must contain something besides whitespace.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "not_blank"))]
        name: String,
        #[validate(email)]
        email: Option<String>,
    }

    #[test]
    fn accepts_valid_input() {
        let s = Sample {
            name: "Kim".into(),
            email: Some("kim@example.com".into()),
        };
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn rejects_blank_required_field() {
        let s = Sample {
            name: "   ".into(),
            email: None,
        };
        let err = validate(&s).unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("name")));
    }

    #[test]
    fn rejects_bad_email() {
        let s = Sample {
            name: "Lee".into(),
            email: Some("not-an-email".into()),
        };
        assert!(validate(&s).is_err());
    }

    #[test]
    fn require_non_blank_names_field() {
        let err = require_non_blank("title", " ").unwrap_err();
        assert!(err.to_string().contains("title"));
    }
}
