//! Shared query parameter types for API handlers.

use mindak_core::error::{CoreError, INVALID_VALUE};
use mindak_core::types::DbId;
use serde::Deserialize;

/// Query parameters for list endpoints that support an `include_inactive` flag.
///
/// Used by categories and answer options.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// `?service_ids=1,2,3` on the client services form.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceIdsParams {
    pub service_ids: Option<String>,
}

impl ServiceIdsParams {
    /// Parse the comma-separated id list. Blank entries are skipped.
    pub fn ids(&self) -> Result<Vec<DbId>, CoreError> {
        let Some(raw) = self.service_ids.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<DbId>().map_err(|_| {
                    CoreError::invalid_field(
                        INVALID_VALUE,
                        "service_ids",
                        format!("'{s}' is not a valid service id"),
                    )
                })
            })
            .collect()
    }
}
