//! HTTP-level tests for reservation submission, lookup, and the admin
//! status workflow.

mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{
    admin_get, admin_post_json, admin_put_json, body_json, build_test_app, get, podcast_answers,
    post_json, seed_podcast_form, send, Caller, ADMIN_ID, CLIENT_ID,
};
use mindak_api::engine::transition::{transition_status, TransitionRequest};
use mindak_api::error::AppError;
use mindak_core::error::CoreError;
use mindak_core::reservation::ReservationKind;
use mindak_core::status::ReservationStatus;
use mindak_core::types::DbId;
use mindak_db::repositories::{AnalyticsRepo, ReservationRepo, StatusHistoryRepo};
use serde_json::json;
use sqlx::PgPool;

async fn submit_podcast(pool: &PgPool, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/reservations/podcast", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn latest_podcast_id(pool: &PgPool) -> DbId {
    let response = admin_get(build_test_app(pool.clone()), "/api/v1/admin/reservations/podcast").await;
    let json = body_json(response).await;
    json["data"][0]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn podcast_submission_freezes_answers(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;

    let json = submit_podcast(&pool, podcast_answers(&form, Some("google"))).await;
    let confirmation_id = json["data"]["confirmation_id"].as_str().unwrap().to_string();
    assert!(confirmation_id.starts_with("POD-"), "{confirmation_id}");
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"].get("client_answers").is_none());

    let id = latest_podcast_id(&pool).await;
    let response = admin_get(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/reservations/podcast/{id}/client-data"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    let answers = data["client_answers"].as_array().unwrap();
    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0]["question_text"], "Name");
    assert_eq!(answers[0]["value"], "Ana");
    assert_eq!(answers[2]["value"], "google");
    assert_eq!(answers[2]["answer_id"], form.google.id);
    assert_eq!(answers[2]["answer_text"], "Google");
    assert_eq!(data["confirmation_id"], confirmation_id);
    assert!(data["client_id"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn optional_question_left_blank_is_recorded_as_null(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;

    let id = latest_podcast_id(&pool).await;
    let response = admin_get(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/reservations/podcast/{id}/client-data"),
    )
    .await;
    let data = body_json(response).await["data"].clone();
    assert!(data["client_answers"][2]["value"].is_null());
    assert!(data["client_answers"][2]["answer_id"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_required_answer_writes_nothing(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    let body = json!({ "answers": [{ "question_id": form.name.id, "value": "Ana" }] });

    let response = post_json(build_test_app(pool.clone()), "/api/v1/reservations/podcast", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"]["validation_code"], "missing_required_answer");
    assert_eq!(json["field"], form.email.id.to_string());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_option_value_is_rejected(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;

    let response = post_json(
        build_test_app(pool),
        "/api/v1/reservations/podcast",
        podcast_answers(&form, Some("radio")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"]["validation_code"], "invalid_answer_option");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn identified_client_is_recorded(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    let response = send(
        build_test_app(pool.clone()),
        Method::POST,
        "/api/v1/reservations/podcast",
        Caller::Client,
        Some(podcast_answers(&form, None)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let id = latest_podcast_id(&pool).await;
    let history = StatusHistoryRepo::list_for_reservation(&pool, id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].previous_status.is_none());
    assert_eq!(history[0].new_status, "pending");
    assert_eq!(history[0].changed_by, Some(CLIENT_ID));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn confirmation_lookup_hides_answers(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    let json = submit_podcast(&pool, podcast_answers(&form, None)).await;
    let confirmation_id = json["data"]["confirmation_id"].as_str().unwrap();

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/reservations/confirmation/{confirmation_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["kind"], "podcast");
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"].get("client_answers").is_none());

    let response = get(build_test_app(pool), "/api/v1/reservations/confirmation/POD-2024-999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn confirmation_ids_are_distinct(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    let a = submit_podcast(&pool, podcast_answers(&form, None)).await;
    let b = submit_podcast(&pool, podcast_answers(&form, None)).await;
    assert_ne!(a["data"]["confirmation_id"], b["data"]["confirmation_id"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn status_workflow_records_history(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;
    let status_uri = format!("/api/v1/admin/reservations/podcast/{id}/status");

    let response = admin_put_json(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "confirmed", "reason": "  slot available  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "confirmed");

    let response = admin_put_json(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = admin_get(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/reservations/podcast/{id}"),
    )
    .await;
    let data = body_json(response).await["data"].clone();
    let history = data["status_history"].as_array().unwrap();
    let transitions: Vec<(serde_json::Value, serde_json::Value)> = history
        .iter()
        .map(|h| (h["previous_status"].clone(), h["new_status"].clone()))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (serde_json::Value::Null, json!("pending")),
            (json!("pending"), json!("confirmed")),
            (json!("confirmed"), json!("completed")),
        ]
    );
    assert_eq!(history[1]["reason"], "slot available");
    assert_eq!(history[1]["changed_by"], ADMIN_ID);

    let events = AnalyticsRepo::list_for_reservation(&pool, id).await.unwrap();
    let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["reservation_submitted", "reservation_confirmed", "reservation_completed"]
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn terminal_status_rejects_transition(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;
    let status_uri = format!("/api/v1/admin/reservations/podcast/{id}/status");

    let response =
        admin_put_json(build_test_app(pool.clone()), &status_uri, json!({ "status": "cancelled" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        admin_put_json(build_test_app(pool.clone()), &status_uri, json!({ "status": "pending" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TRANSITION");
    assert_eq!(json["details"]["from"], "cancelled");

    let history = StatusHistoryRepo::list_for_reservation(&pool, id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stale_expected_status_is_a_conflict(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;

    let response = admin_put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/reservations/podcast/{id}/status"),
        json!({ "status": "cancelled", "expected_status": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_kind_is_not_found(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;

    let response = admin_get(
        build_test_app(pool),
        &format!("/api/v1/admin/reservations/service/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        format!("ServiceReservation with id {id} not found")
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn racing_transitions_have_one_winner(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;

    let request = |changed_by| TransitionRequest {
        kind: ReservationKind::Podcast,
        reservation_id: id,
        target: ReservationStatus::Confirmed,
        reason: None,
        expected_status: None,
        changed_by,
    };
    let (a, b) = tokio::join!(
        transition_status(&pool, request(1)),
        transition_status(&pool, request(2)),
    );

    let (winner, loser) = match (a, b) {
        (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
        (a, b) => panic!("expected exactly one winner, got {a:?} / {b:?}"),
    };
    assert_eq!(winner.status, "confirmed");
    assert_matches!(
        loser,
        AppError::Core(CoreError::Conflict(_) | CoreError::InvalidTransition { .. })
    );

    let history = StatusHistoryRepo::list_for_reservation(&pool, id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn conflicting_targets_from_pending_have_one_winner(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;

    let request = |target, changed_by| TransitionRequest {
        kind: ReservationKind::Podcast,
        reservation_id: id,
        target,
        reason: None,
        expected_status: Some(ReservationStatus::Pending),
        changed_by,
    };
    let (confirm, cancel) = tokio::join!(
        transition_status(&pool, request(ReservationStatus::Confirmed, 1)),
        transition_status(&pool, request(ReservationStatus::Cancelled, 2)),
    );

    let (winner, loser) = match (confirm, cancel) {
        (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
        (a, b) => panic!("expected exactly one winner, got {a:?} / {b:?}"),
    };
    assert_matches!(
        loser,
        AppError::Core(CoreError::Conflict(_) | CoreError::InvalidTransition { .. })
    );

    let stored = ReservationRepo::find_by_id(&pool, ReservationKind::Podcast, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, winner.status);

    let history = StatusHistoryRepo::list_for_reservation(&pool, id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].previous_status.as_deref(), Some("pending"));
    assert_eq!(history[1].new_status, winner.status);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn notes_are_appended_and_listed(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;
    let notes_uri = format!("/api/v1/admin/reservations/podcast/{id}/notes");

    let response =
        admin_post_json(build_test_app(pool.clone()), &notes_uri, json!({ "text": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"]["validation_code"], "empty_note");

    let response = admin_post_json(
        build_test_app(pool.clone()),
        &notes_uri,
        json!({ "text": "Called the client" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = admin_get(build_test_app(pool), &notes_uri).await;
    let json = body_json(response).await;
    let notes = json["data"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["text"], "Called the client");
    assert_eq!(notes[0]["author_id"], ADMIN_ID);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_removes_reservation(pool: PgPool) {
    let form = seed_podcast_form(&pool).await;
    submit_podcast(&pool, podcast_answers(&form, None)).await;
    let id = latest_podcast_id(&pool).await;
    let uri = format!("/api/v1/admin/reservations/podcast/{id}");

    let response = common::admin_delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = admin_get(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
