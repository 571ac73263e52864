//! Service category model.

use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `service_categories` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateServiceCategory {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for updating a category. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateServiceCategory {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
