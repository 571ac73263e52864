//! Repository for `analytics_events` and the reservation aggregates behind
//! the analytics reports.
//!
//! Date ranges are inclusive calendar days; `$n::DATE + 1` is the exclusive
//! upper bound.

use mindak_core::analytics::{DateRange, TrendInterval};
use mindak_core::reservation::ReservationKind;
use mindak_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::analytics::{
    AnalyticsEvent, KindStatusCount, NewAnalyticsEvent, ServiceReservationCount, TrendRow,
};

/// Column list for analytics_events queries.
const COLUMNS: &str = "id, event_type, reservation_id, event_data, created_at";

pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Record an event. Server-side events are written in the transaction of
    /// the change they describe.
    pub async fn record<'e, E: PgExecutor<'e>>(
        executor: E,
        event: &NewAnalyticsEvent<'_>,
    ) -> Result<AnalyticsEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO analytics_events (event_type, reservation_id, event_data)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(event.event_type)
            .bind(event.reservation_id)
            .bind(&event.event_data)
            .fetch_one(executor)
            .await
    }

    /// Events attached to one reservation, oldest first.
    pub async fn list_for_reservation(
        pool: &PgPool,
        reservation_id: DbId,
    ) -> Result<Vec<AnalyticsEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analytics_events
             WHERE reservation_id = $1
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(reservation_id)
            .fetch_all(pool)
            .await
    }

    /// Reservation counts grouped by kind and status, optionally limited to
    /// reservations created within `range`.
    pub async fn count_by_kind_status(
        pool: &PgPool,
        range: Option<DateRange>,
    ) -> Result<Vec<KindStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, KindStatusCount>(
            "SELECT kind, status, COUNT(*) AS count FROM reservations
             WHERE ($1::DATE IS NULL OR created_at >= $1::DATE)
               AND ($2::DATE IS NULL OR created_at < $2::DATE + 1)
             GROUP BY kind, status
             ORDER BY kind, status",
        )
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .fetch_all(pool)
        .await
    }

    /// Reservations created at or after `since`.
    pub async fn count_reservations_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
    }

    /// Events recorded at or after `since`.
    pub async fn count_events_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM analytics_events WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
    }

    /// Service reservations per requested service, most requested first.
    pub async fn count_by_service(
        pool: &PgPool,
        range: Option<DateRange>,
        limit: Option<i64>,
    ) -> Result<Vec<ServiceReservationCount>, sqlx::Error> {
        sqlx::query_as::<_, ServiceReservationCount>(
            "SELECT s.id AS service_id, s.name AS service_name, COUNT(r.id) AS count
             FROM reservations r
             CROSS JOIN LATERAL UNNEST(r.service_ids) AS requested(service_id)
             JOIN services s ON s.id = requested.service_id
             WHERE r.kind = 'service'
               AND ($1::DATE IS NULL OR r.created_at >= $1::DATE)
               AND ($2::DATE IS NULL OR r.created_at < $2::DATE + 1)
             GROUP BY s.id, s.name
             ORDER BY count DESC, s.id
             LIMIT $3",
        )
        .bind(range.map(|r| r.start))
        .bind(range.map(|r| r.end))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Sparse per-bucket reservation counts. Empty buckets are absent; the
    /// caller zero-fills them.
    pub async fn reservation_trend(
        pool: &PgPool,
        kind: Option<ReservationKind>,
        interval: TrendInterval,
        range: DateRange,
    ) -> Result<Vec<TrendRow>, sqlx::Error> {
        sqlx::query_as::<_, TrendRow>(
            "SELECT date_trunc($1::TEXT, created_at)::DATE AS period, COUNT(*) AS count
             FROM reservations
             WHERE ($2::TEXT IS NULL OR kind = $2)
               AND created_at >= $3::DATE
               AND created_at < $4::DATE + 1
             GROUP BY period
             ORDER BY period",
        )
        .bind(interval.as_str())
        .bind(kind.map(|k| k.as_str()))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
    }
}
