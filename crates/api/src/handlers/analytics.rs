//! Analytics: client event recording and admin reporting.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use validator::Validate;

use mindak_core::analytics::{
    conversion_rate, fill_trend, resolve_range, validate_client_event_type, DEFAULT_TOP_SERVICES,
    MAX_TOP_SERVICES, REALTIME_LATEST_LIMIT,
};
use mindak_core::error::{CoreError, INVALID_VALUE};
use mindak_core::reservation::ReservationKind;
use mindak_core::search::clamp_limit;
use mindak_db::models::analytics::{
    AnalyticsRangeParams, CreateAnalyticsEvent, DashboardMetrics, KindAnalytics,
    NewAnalyticsEvent, RealtimeDashboard, ServiceAnalytics, StatusTotals, TopServicesParams,
    TrendAnalysis, TrendParams,
};
use mindak_db::repositories::{AnalyticsRepo, ReservationRepo};
use mindak_db::DbPool;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /analytics/events
///
/// Public. Only view events may be recorded from outside; reservation
/// lifecycle events are written by the server itself.
pub async fn record_event(
    State(state): State<AppState>,
    Json(input): Json<CreateAnalyticsEvent>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_client_event_type(&input.event_type)?;

    let event_data = input.event_data.unwrap_or_else(|| serde_json::json!({}));
    if !event_data.is_object() {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "event_data",
            "event_data must be a JSON object",
        )
        .into());
    }

    let event = AnalyticsRepo::record(
        &state.pool,
        &NewAnalyticsEvent {
            event_type: &input.event_type,
            reservation_id: None,
            event_data,
        },
    )
    .await?;

    tracing::debug!(event_id = event.id, event_type = %event.event_type, "Analytics event recorded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /admin/analytics/dashboard
///
/// All-time totals per kind and status, plus the last seven days' volume.
pub async fn dashboard(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = AnalyticsRepo::count_by_kind_status(&state.pool, None).await?;
    let totals = StatusTotals::from_counts(&rows, None);
    let last_7_days =
        AnalyticsRepo::count_reservations_since(&state.pool, Utc::now() - Duration::days(7)).await?;

    Ok(Json(DataResponse {
        data: DashboardMetrics {
            conversion_rate: conversion_rate(totals.converted(), totals.total),
            podcast: StatusTotals::from_counts(&rows, Some(ReservationKind::Podcast)),
            service: StatusTotals::from_counts(&rows, Some(ReservationKind::Service)),
            totals,
            last_7_days,
        },
    }))
}

async fn kind_analytics(
    pool: &DbPool,
    kind: ReservationKind,
    params: &AnalyticsRangeParams,
) -> AppResult<KindAnalytics> {
    let range = resolve_range(params.start_date, params.end_date, Utc::now().date_naive())?;
    let rows = AnalyticsRepo::count_by_kind_status(pool, Some(range)).await?;
    let totals = StatusTotals::from_counts(&rows, Some(kind));
    Ok(KindAnalytics {
        kind,
        range,
        conversion_rate: conversion_rate(totals.converted(), totals.total),
        totals,
    })
}

/// GET /admin/analytics/podcast?start_date=&end_date=
pub async fn podcast_analytics(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AnalyticsRangeParams>,
) -> AppResult<impl IntoResponse> {
    let data = kind_analytics(&state.pool, ReservationKind::Podcast, &params).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /admin/analytics/services?start_date=&end_date=
pub async fn service_analytics(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AnalyticsRangeParams>,
) -> AppResult<impl IntoResponse> {
    let summary = kind_analytics(&state.pool, ReservationKind::Service, &params).await?;
    let by_service = AnalyticsRepo::count_by_service(&state.pool, Some(summary.range), None).await?;
    Ok(Json(DataResponse {
        data: ServiceAnalytics {
            summary,
            by_service,
        },
    }))
}

/// GET /admin/analytics/trends?interval=day|week|month&kind=&start_date=&end_date=
pub async fn trends(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> AppResult<impl IntoResponse> {
    let range = resolve_range(params.start_date, params.end_date, Utc::now().date_naive())?;
    let interval = params.interval.unwrap_or_default();

    let rows = AnalyticsRepo::reservation_trend(&state.pool, params.kind, interval, range).await?;
    let rows: Vec<_> = rows.into_iter().map(|r| (r.period, r.count)).collect();

    Ok(Json(DataResponse {
        data: TrendAnalysis {
            kind: params.kind,
            interval,
            range,
            points: fill_trend(range, interval, &rows),
        },
    }))
}

/// GET /admin/analytics/top-services?limit=&start_date=&end_date=
pub async fn top_services(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<TopServicesParams>,
) -> AppResult<impl IntoResponse> {
    let range = resolve_range(params.start_date, params.end_date, Utc::now().date_naive())?;
    let limit = clamp_limit(params.limit, DEFAULT_TOP_SERVICES, MAX_TOP_SERVICES);
    let services = AnalyticsRepo::count_by_service(&state.pool, Some(range), Some(limit)).await?;
    Ok(Json(DataResponse { data: services }))
}

/// GET /admin/analytics/realtime
pub async fn realtime(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = AnalyticsRepo::count_by_kind_status(&state.pool, None).await?;
    let events_last_hour =
        AnalyticsRepo::count_events_since(&state.pool, Utc::now() - Duration::hours(1)).await?;
    let latest = ReservationRepo::list_latest(&state.pool, REALTIME_LATEST_LIMIT).await?;

    Ok(Json(DataResponse {
        data: RealtimeDashboard {
            pending_podcast: StatusTotals::from_counts(&rows, Some(ReservationKind::Podcast)).pending,
            pending_service: StatusTotals::from_counts(&rows, Some(ReservationKind::Service)).pending,
            events_last_hour,
            latest,
        },
    }))
}
