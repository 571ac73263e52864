//! Service catalog model.

use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `services` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Service {
    pub id: DbId,
    pub category_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a service.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateService {
    pub category_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

/// DTO for updating a service. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateService {
    pub category_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

/// DTO for setting the active flag on several services at once.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkServiceStatus {
    #[validate(length(min = 1, max = 500))]
    pub service_ids: Vec<DbId>,
    pub is_active: bool,
}

/// Filters for the admin service list.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceListParams {
    pub include_inactive: Option<bool>,
    pub category_id: Option<DbId>,
}
