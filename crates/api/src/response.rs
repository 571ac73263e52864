//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })` to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// What a delete request actually did to a definition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Referenced by a stored snapshot, so only marked inactive.
    Deactivated,
    /// Removed permanently.
    Deleted,
}

/// Body returned by soft-or-hard delete endpoints.
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub id: mindak_core::types::DbId,
    pub outcome: DeleteOutcome,
}
