use std::fmt;

use serde::Serialize;

use crate::status::ReservationStatus;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Validation codes
// ---------------------------------------------------------------------------

/// A required question received no value.
pub const MISSING_REQUIRED_ANSWER: &str = "missing_required_answer";
/// A submitted answer references a question outside the active set.
pub const UNKNOWN_QUESTION: &str = "unknown_question";
/// A choice answer does not match any active option.
pub const INVALID_ANSWER_OPTION: &str = "invalid_answer_option";
/// A free-text answer failed type coercion (email, phone, date).
pub const INVALID_FORMAT: &str = "invalid_format";
/// A required choice question has no active options to choose from.
pub const QUESTION_WITHOUT_OPTIONS: &str = "question_without_options";
/// A reorder request does not name exactly the active members of the group.
pub const REORDER_MISMATCH: &str = "reorder_mismatch";
/// Note text is empty after trimming.
pub const EMPTY_NOTE: &str = "empty_note";
/// Generic malformed input.
pub const INVALID_VALUE: &str = "invalid_value";

/// A structured, user-correctable validation failure.
///
/// `code` is a stable machine-readable identifier, `field` names the
/// offending field or id (when there is one), `message` is for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            field: None,
            message: message.into(),
        }
    }

    /// Attach the offending field name or id.
    pub fn with_field(mut self, field: impl ToString) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} ({}: {})", self.message, self.code, field),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation error without a field.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation(ValidationError::new(code, message))
    }

    /// Shorthand for a validation error pointing at a field or id.
    pub fn invalid_field(
        code: &'static str,
        field: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        CoreError::Validation(ValidationError::new(code, message).with_field(field))
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_includes_code_and_field() {
        let err = ValidationError::new(UNKNOWN_QUESTION, "Question is not part of this form")
            .with_field(42);
        assert_eq!(
            err.to_string(),
            "Question is not part of this form (unknown_question: 42)"
        );
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = CoreError::InvalidTransition {
            from: ReservationStatus::Pending,
            to: ReservationStatus::Completed,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from 'pending' to 'completed'"
        );
    }
}
