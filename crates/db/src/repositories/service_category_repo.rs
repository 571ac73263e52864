//! Repository for the `service_categories` table.

use mindak_core::types::DbId;
use sqlx::PgPool;

use crate::models::service_category::{
    CreateServiceCategory, ServiceCategory, UpdateServiceCategory,
};

/// Column list for service_categories queries.
const COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

/// Provides CRUD operations for service categories.
pub struct ServiceCategoryRepo;

impl ServiceCategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateServiceCategory,
    ) -> Result<ServiceCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_categories (name, description, is_active)
             VALUES ($1, $2, COALESCE($3, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceCategory>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_categories WHERE id = $1");
        sqlx::query_as::<_, ServiceCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List categories by name. Inactive ones only when asked for.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<ServiceCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_categories
             WHERE $1 OR is_active
             ORDER BY name, id"
        );
        sqlx::query_as::<_, ServiceCategory>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a category. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateServiceCategory,
    ) -> Result<Option<ServiceCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE service_categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Its services keep existing, uncategorized.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
