//! Analytics event model and aggregate report shapes.

use chrono::NaiveDate;
use mindak_core::analytics::{DateRange, TrendInterval, TrendPoint};
use mindak_core::reservation::ReservationKind;
use mindak_core::status::ReservationStatus;
use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::reservation::ReservationSummary;

/// A row from the `analytics_events` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AnalyticsEvent {
    pub id: DbId,
    pub event_type: String,
    pub reservation_id: Option<DbId>,
    pub event_data: serde_json::Value,
    pub created_at: Timestamp,
}

/// Client-recorded event (`form_viewed`, `service_viewed`).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnalyticsEvent {
    #[validate(length(min = 1, max = 64))]
    pub event_type: String,
    pub event_data: Option<serde_json::Value>,
}

/// An event to insert.
#[derive(Debug, Clone)]
pub struct NewAnalyticsEvent<'a> {
    pub event_type: &'a str,
    pub reservation_id: Option<DbId>,
    pub event_data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Aggregation rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KindStatusCount {
    pub kind: String,
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceReservationCount {
    pub service_id: DbId,
    pub service_name: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TrendRow {
    pub period: NaiveDate,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Reservation counts per status for one kind (or both).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
    pub completed: i64,
}

impl StatusTotals {
    /// Fold grouped rows, keeping only those matching `kind` when given.
    pub fn from_counts(rows: &[KindStatusCount], kind: Option<ReservationKind>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            if kind.is_some_and(|k| k.as_str() != row.kind) {
                continue;
            }
            totals.total += row.count;
            match row.status.parse::<ReservationStatus>() {
                Ok(ReservationStatus::Pending) => totals.pending += row.count,
                Ok(ReservationStatus::Confirmed) => totals.confirmed += row.count,
                Ok(ReservationStatus::Cancelled) => totals.cancelled += row.count,
                Ok(ReservationStatus::Completed) => totals.completed += row.count,
                Err(_) => {}
            }
        }
        totals
    }

    /// Reservations that were accepted: confirmed or completed.
    pub fn converted(&self) -> i64 {
        self.confirmed + self.completed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub totals: StatusTotals,
    pub podcast: StatusTotals,
    pub service: StatusTotals,
    pub conversion_rate: f64,
    pub last_7_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KindAnalytics {
    pub kind: ReservationKind,
    pub range: DateRange,
    pub totals: StatusTotals,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceAnalytics {
    #[serde(flatten)]
    pub summary: KindAnalytics,
    pub by_service: Vec<ServiceReservationCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub kind: Option<ReservationKind>,
    pub interval: TrendInterval,
    pub range: DateRange,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeDashboard {
    pub pending_podcast: i64,
    pub pending_service: i64,
    pub events_last_hour: i64,
    pub latest: Vec<ReservationSummary>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsRangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    pub interval: Option<TrendInterval>,
    pub kind: Option<ReservationKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopServicesParams {
    pub limit: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
