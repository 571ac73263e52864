//! Repository for the `services` table.

use mindak_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::service::{CreateService, Service, ServiceListParams, UpdateService};

/// Column list for services queries.
const COLUMNS: &str = "id, category_id, name, description, price_cents, is_active, \
    display_order, created_at, updated_at";

/// Same columns, qualified for queries that join `services s`.
const S_COLUMNS: &str = "s.id, s.category_id, s.name, s.description, s.price_cents, \
    s.is_active, s.display_order, s.created_at, s.updated_at";

/// Provides CRUD and status operations for the service catalog.
pub struct ServiceRepo;

impl ServiceRepo {
    /// Insert a new service, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateService) -> Result<Service, sqlx::Error> {
        let query = format!(
            "INSERT INTO services
                (category_id, name, description, price_cents, is_active, display_order)
             VALUES ($1, $2, $3, $4, COALESCE($5, TRUE), COALESCE($6, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(input.is_active)
            .bind(input.display_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Admin listing, optionally filtered by category.
    pub async fn list(
        pool: &PgPool,
        params: &ServiceListParams,
    ) -> Result<Vec<Service>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM services
             WHERE ($1 OR is_active)
               AND ($2::BIGINT IS NULL OR category_id = $2)
             ORDER BY display_order, name, id"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(params.include_inactive.unwrap_or(false))
            .bind(params.category_id)
            .fetch_all(pool)
            .await
    }

    /// Services a client may book: active, in an active category or none.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Service>, sqlx::Error> {
        let query = format!(
            "SELECT {S_COLUMNS} FROM services s
             LEFT JOIN service_categories c ON c.id = s.category_id
             WHERE s.is_active AND (c.id IS NULL OR c.is_active)
             ORDER BY s.display_order, s.name, s.id"
        );
        sqlx::query_as::<_, Service>(&query).fetch_all(pool).await
    }

    /// Bookable services among `ids`, in no particular order.
    ///
    /// Rows are share-locked so a concurrent delete waits for the caller's
    /// transaction.
    pub async fn find_active_by_ids<'e, E: PgExecutor<'e>>(
        executor: E,
        ids: &[DbId],
    ) -> Result<Vec<Service>, sqlx::Error> {
        let query = format!(
            "SELECT {S_COLUMNS} FROM services s
             LEFT JOIN service_categories c ON c.id = s.category_id
             WHERE s.id = ANY($1) AND s.is_active AND (c.id IS NULL OR c.is_active)
             FOR SHARE OF s"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// The subset of `ids` that exist, active or not.
    pub async fn find_existing_ids<'e, E: PgExecutor<'e>>(
        executor: E,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM services WHERE id = ANY($1) FOR UPDATE")
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// Update a service. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateService,
    ) -> Result<Option<Service>, sqlx::Error> {
        let query = format!(
            "UPDATE services SET
                category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                price_cents = COALESCE($5, price_cents),
                is_active = COALESCE($6, is_active),
                display_order = COALESCE($7, display_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(input.is_active)
            .bind(input.display_order)
            .fetch_optional(pool)
            .await
    }

    /// Flip the active flag.
    pub async fn toggle_status(pool: &PgPool, id: DbId) -> Result<Option<Service>, sqlx::Error> {
        let query = format!(
            "UPDATE services SET is_active = NOT is_active
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set the active flag on every service in `ids` in one statement.
    pub async fn bulk_set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        ids: &[DbId],
        is_active: bool,
    ) -> Result<Vec<Service>, sqlx::Error> {
        let query = format!(
            "UPDATE services SET is_active = $2
             WHERE id = ANY($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(ids)
            .bind(is_active)
            .fetch_all(executor)
            .await
    }

    /// Lock a service row for update. Returns `false` if it does not exist.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, DbId>("SELECT id FROM services WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(found.is_some())
    }

    /// Whether any reservation, in any status, requested this service.
    pub async fn is_referenced<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reservations WHERE service_ids @> ARRAY[$1::BIGINT])",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Delete a service. Its service-specific questions cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
