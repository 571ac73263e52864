//! Reservation note and transition-reason validation.

use crate::error::{CoreError, EMPTY_NOTE, INVALID_VALUE};

/// Maximum length of a note, in characters.
pub const MAX_NOTE_LENGTH: usize = 10_000;

/// Maximum length of a status-change reason, in characters.
pub const MAX_REASON_LENGTH: usize = 1_000;

/// Validate note text, returning it trimmed.
pub fn validate_note_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_field(
            EMPTY_NOTE,
            "text",
            "Note text cannot be empty",
        ));
    }
    if trimmed.chars().count() > MAX_NOTE_LENGTH {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "text",
            format!("Note text exceeds maximum length of {MAX_NOTE_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional transition reason: blank becomes `None`.
pub fn normalize_reason(reason: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    if reason.chars().count() > MAX_REASON_LENGTH {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "reason",
            format!("Reason exceeds maximum length of {MAX_REASON_LENGTH} characters"),
        ));
    }
    Ok(Some(reason.to_string()))
}
