//! HTTP-level tests for event recording and the admin analytics views.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use common::{
    admin_get, admin_put_json, body_json, build_test_app, create_service, post_json,
};
use serde_json::json;
use sqlx::PgPool;

/// Two podcast reservations (one confirmed) and one service reservation.
async fn seed_reservations(pool: &PgPool) -> i64 {
    let mixing = create_service(pool, "Mixing").await;
    for _ in 0..2 {
        let response = post_json(
            build_test_app(pool.clone()),
            "/api/v1/reservations/podcast",
            json!({ "answers": [] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/reservations/service",
        json!({ "service_ids": [mixing.id], "answers": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = admin_get(build_test_app(pool.clone()), "/api/v1/admin/reservations/podcast").await;
    let id = body_json(response).await["data"][0]["id"].as_i64().unwrap();
    let response = admin_put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/reservations/podcast/{id}/status"),
        json!({ "status": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    mixing.id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn client_can_record_view_events_only(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/analytics/events",
        json!({ "event_type": "form_viewed", "event_data": { "form": "podcast" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["event_data"]["form"], "podcast");

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/analytics/events",
        json!({ "event_type": "service_viewed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["event_data"], json!({}));

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/analytics/events",
        json!({ "event_type": "reservation_confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "event_type");

    let response = post_json(
        build_test_app(pool),
        "/api/v1/analytics/events",
        json!({ "event_type": "form_viewed", "event_data": [1, 2] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dashboard_counts_by_kind_and_status(pool: PgPool) {
    seed_reservations(&pool).await;

    let response = admin_get(build_test_app(pool), "/api/v1/admin/analytics/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["totals"]["total"], 3);
    assert_eq!(data["podcast"]["pending"], 1);
    assert_eq!(data["podcast"]["confirmed"], 1);
    assert_eq!(data["service"]["pending"], 1);
    assert_eq!(data["conversion_rate"], 33.33);
    assert_eq!(data["last_7_days"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn service_analytics_break_down_per_service(pool: PgPool) {
    let mixing = seed_reservations(&pool).await;

    let response = admin_get(build_test_app(pool.clone()), "/api/v1/admin/analytics/services").await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["kind"], "service");
    assert_eq!(data["totals"]["total"], 1);
    assert_eq!(data["by_service"][0]["service_id"], mixing);
    assert_eq!(data["by_service"][0]["count"], 1);

    let response = admin_get(build_test_app(pool), "/api/v1/admin/analytics/top-services?limit=1").await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["service_name"], "Mixing");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn trends_are_zero_filled(pool: PgPool) {
    seed_reservations(&pool).await;
    let today = Utc::now().date_naive();
    let start = today.checked_sub_days(Days::new(6)).unwrap();

    let response = admin_get(
        build_test_app(pool),
        &format!("/api/v1/admin/analytics/trends?interval=day&start_date={start}&end_date={today}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    let points = data["points"].as_array().unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(points[0]["period"], start.to_string());
    let total: i64 = points.iter().map(|p| p["count"].as_i64().unwrap()).sum();
    assert_eq!(total, 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reversed_range_is_rejected(pool: PgPool) {
    let response = admin_get(
        build_test_app(pool),
        "/api/v1/admin/analytics/podcast?start_date=2024-02-01&end_date=2024-01-01",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "start_date");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn realtime_shows_pending_and_latest(pool: PgPool) {
    seed_reservations(&pool).await;

    let response = admin_get(build_test_app(pool), "/api/v1/admin/analytics/realtime").await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["pending_podcast"], 1);
    assert_eq!(data["pending_service"], 1);
    assert_eq!(data["latest"].as_array().unwrap().len(), 3);
    // Three submissions and one confirmation.
    assert_eq!(data["events_last_hour"], 4);
}
