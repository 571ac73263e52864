//! HTTP-level tests for the service catalog: categories, services, deletion
//! guards, and bulk status changes.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_delete, admin_get, admin_post_json, admin_put_json, body_json, build_test_app,
    create_service, get, post_json, send, Caller,
};
use serde_json::json;
use sqlx::PgPool;

fn names(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn category_crud(pool: PgPool) {
    let response = admin_post_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/categories",
        json!({ "name": "  Audio  ", "description": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Audio");
    assert!(json["data"]["description"].is_null());
    let id = json["data"]["id"].as_i64().unwrap();

    let response = admin_put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/categories/{id}"),
        json!({ "name": "Audio post-production" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Audio post-production");

    let uri = format!("/api/v1/admin/categories/{id}");
    let response = admin_delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = admin_get(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_names_are_conflicts(pool: PgPool) {
    create_service(&pool, "Mixing").await;

    let response = admin_post_json(
        build_test_app(pool),
        "/api/v1/admin/services",
        json!({ "name": "mixing", "price_cents": 5000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn service_validation(pool: PgPool) {
    let response = admin_post_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/services",
        json!({ "name": "Mixing", "price_cents": -1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "price_cents");

    let response = admin_post_json(
        build_test_app(pool),
        "/api/v1/admin/services",
        json!({ "name": "Mixing", "price_cents": 100, "category_id": 9999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_active_services_are_listed_publicly(pool: PgPool) {
    create_service(&pool, "Mixing").await;
    let mastering = create_service(&pool, "Mastering").await;

    let response = admin_put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/services/{}", mastering.id),
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(build_test_app(pool.clone()), "/api/v1/services/active").await;
    assert_eq!(names(&body_json(response).await["data"]), vec!["Mixing"]);

    let response = admin_get(
        build_test_app(pool),
        "/api/v1/admin/services?include_inactive=true",
    )
    .await;
    assert_eq!(
        names(&body_json(response).await["data"]),
        vec!["Mastering", "Mixing"]
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unreferenced_service_is_deleted(pool: PgPool) {
    let mixing = create_service(&pool, "Mixing").await;
    let uri = format!("/api/v1/admin/services/{}", mixing.id);

    let response = admin_delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = admin_delete(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn booked_service_cannot_be_deleted(pool: PgPool) {
    let mixing = create_service(&pool, "Mixing").await;
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/reservations/service",
        json!({ "service_ids": [mixing.id], "answers": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/v1/admin/services/{}", mixing.id);
    let response = admin_delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = admin_get(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn toggle_flips_active_flag(pool: PgPool) {
    let mixing = create_service(&pool, "Mixing").await;
    let uri = format!("/api/v1/admin/services/{}/toggle", mixing.id);

    for expected in [false, true] {
        let response = send(build_test_app(pool.clone()), Method::POST, &uri, Caller::Admin, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["is_active"], expected);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_status_updates_every_service(pool: PgPool) {
    let a = create_service(&pool, "Mixing").await;
    let b = create_service(&pool, "Mastering").await;

    let response = admin_put_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/services/bulk-status",
        json!({ "service_ids": [a.id, b.id, a.id], "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|s| s["is_active"] == false));

    let response = get(build_test_app(pool), "/api/v1/services/active").await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bulk_status_with_unknown_id_changes_nothing(pool: PgPool) {
    let a = create_service(&pool, "Mixing").await;

    let response = admin_put_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/services/bulk-status",
        json!({ "service_ids": [a.id, 9999], "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(build_test_app(pool), "/api/v1/services/active").await;
    assert_eq!(names(&body_json(response).await["data"]), vec!["Mixing"]);
}
