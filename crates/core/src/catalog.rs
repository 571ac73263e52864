//! Service catalog validation: categories, services, bulk status updates.

use std::collections::HashSet;

use crate::error::{CoreError, INVALID_VALUE};
use crate::types::DbId;

/// Maximum length of a service or category name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a service or category description.
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;

/// Maximum number of ids accepted by a bulk status update.
pub const MAX_BULK_IDS: usize = 500;

/// Validate a catalog entry name, returning it trimmed.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "name",
            "Name cannot be empty",
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "name",
            format!("Name exceeds maximum length of {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional description. Blank becomes `None`.
pub fn normalize_description(description: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(text) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "description",
            format!("Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }
    Ok(Some(text.to_string()))
}

/// Prices are stored in minor units and may not be negative.
pub fn validate_price_cents(price_cents: i64) -> Result<(), CoreError> {
    if price_cents < 0 {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "price_cents",
            "Price cannot be negative",
        ));
    }
    Ok(())
}

/// Validate the id list of a bulk status update.
///
/// Duplicates are dropped; an empty or oversized list is rejected.
pub fn normalize_bulk_ids(ids: &[DbId]) -> Result<Vec<DbId>, CoreError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<DbId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    if unique.is_empty() {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "service_ids",
            "At least one service id is required",
        ));
    }
    if unique.len() > MAX_BULK_IDS {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "service_ids",
            format!("At most {MAX_BULK_IDS} services can be updated at once"),
        ));
    }
    Ok(unique)
}

/// Return the first requested id not present in `found`, if any.
pub fn first_missing_id(requested: &[DbId], found: &[DbId]) -> Option<DbId> {
    let found: HashSet<DbId> = found.iter().copied().collect();
    requested.iter().copied().find(|id| !found.contains(id))
}
