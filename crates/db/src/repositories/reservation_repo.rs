//! Repository for the `reservations` table.
//!
//! Status changes use an optimistic `version` check: the update only applies
//! if the row still carries the version the caller read, so two racing
//! transitions cannot both commit.

use mindak_core::reservation::ReservationKind;
use mindak_core::search::{
    clamp_limit, clamp_offset, like_pattern, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use mindak_core::status::ReservationStatus;
use mindak_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::reservation::{
    NewReservation, Reservation, ReservationConfirmation, ReservationListParams,
    ReservationSummary,
};

/// Column list for full reservation queries.
const COLUMNS: &str = "id, kind, confirmation_id, client_id, status, client_answers, \
    service_ids, client_ip, user_agent, version, created_at, updated_at";

/// Column list for list views (no answer snapshot).
const SUMMARY_COLUMNS: &str =
    "id, kind, confirmation_id, client_id, status, service_ids, created_at, updated_at";

/// Provides persistence for podcast and service reservations.
pub struct ReservationRepo;

impl ReservationRepo {
    /// Draw the next confirmation counter value for `kind`.
    pub async fn next_confirmation_sequence(
        conn: &mut PgConnection,
        kind: ReservationKind,
    ) -> Result<i64, sqlx::Error> {
        let sequence = match kind {
            ReservationKind::Podcast => "podcast_confirmation_seq",
            ReservationKind::Service => "service_confirmation_seq",
        };
        sqlx::query_scalar::<_, i64>(&format!("SELECT nextval('{sequence}')"))
            .fetch_one(conn)
            .await
    }

    /// Insert a new reservation in `pending` status.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewReservation,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservations
                (kind, confirmation_id, client_id, status, client_answers, service_ids,
                 client_ip, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(input.kind.as_str())
            .bind(&input.confirmation_id)
            .bind(input.client_id)
            .bind(ReservationStatus::Pending.as_str())
            .bind(Json(&input.client_answers))
            .bind(&input.service_ids)
            .bind(&input.client_ip)
            .bind(&input.user_agent)
            .fetch_one(conn)
            .await
    }

    /// Find a reservation of the given kind by id.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        kind: ReservationKind,
        id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1 AND kind = $2");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Public lookup by confirmation id.
    pub async fn find_confirmation(
        pool: &PgPool,
        confirmation_id: &str,
    ) -> Result<Option<ReservationConfirmation>, sqlx::Error> {
        sqlx::query_as::<_, ReservationConfirmation>(
            "SELECT confirmation_id, kind, status, created_at
             FROM reservations WHERE confirmation_id = $1",
        )
        .bind(confirmation_id)
        .fetch_optional(pool)
        .await
    }

    /// Newest-first listing with optional status filter and confirmation-id
    /// search.
    pub async fn list(
        pool: &PgPool,
        kind: ReservationKind,
        params: &ReservationListParams,
    ) -> Result<Vec<ReservationSummary>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(params.offset);
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM reservations
             WHERE kind = $1
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::TEXT IS NULL OR confirmation_id ILIKE $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ReservationSummary>(&query)
            .bind(kind.as_str())
            .bind(params.status.map(|s| s.as_str()))
            .bind(like_pattern(params.q.as_deref()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// The most recent reservations of any kind.
    pub async fn list_latest(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<ReservationSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM reservations
             ORDER BY created_at DESC, id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, ReservationSummary>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Set a new status if the row is still at `expected_version`.
    ///
    /// Returns `None` when another writer got there first (or the row is
    /// gone); the caller decides how to report that.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        expected_version: i32,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "UPDATE reservations SET status = $3, version = version + 1
             WHERE id = $1 AND version = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(status.as_str())
            .fetch_optional(conn)
            .await
    }

    /// Hard-delete a reservation; history and notes cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, kind: ReservationKind, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
