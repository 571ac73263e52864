#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use mindak_api::config::ServerConfig;
use mindak_api::router::build_app_router;
use mindak_api::state::AppState;
use mindak_core::forms::{FormType, QuestionType, SectionType};
use mindak_core::types::DbId;
use mindak_db::models::form_question::{CreateFormQuestion, FormQuestion};
use mindak_db::models::form_question_answer::{CreateFormQuestionAnswer, FormQuestionAnswer};
use mindak_db::models::service::{CreateService, Service};
use mindak_db::repositories::ServiceRepo;

pub const ADMIN_ID: DbId = 1;
pub const CLIENT_ID: DbId = 500;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uploads go to a fresh directory under the system temp dir so parallel
/// tests never share files.
pub fn test_config() -> ServerConfig {
    let upload_dir =
        std::env::temp_dir().join(format!("mindak-test-uploads-{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&upload_dir).unwrap();

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir,
        upload_max_bytes: 1024,
        podcast_confirmation_prefix: "POD".to_string(),
        service_confirmation_prefix: "SRV".to_string(),
    }
}

/// Build the full application router, using the given database pool.
///
/// Goes through `build_app_router` so tests exercise the same middleware
/// stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Who is calling: nobody, a signed-in client, or an admin.
#[derive(Debug, Clone, Copy)]
pub enum Caller {
    Anonymous,
    Client,
    Admin,
}

fn with_identity(builder: axum::http::request::Builder, caller: Caller) -> axum::http::request::Builder {
    match caller {
        Caller::Anonymous => builder,
        Caller::Client => builder
            .header("x-user-id", CLIENT_ID.to_string())
            .header("x-user-role", "user"),
        Caller::Admin => builder
            .header("x-user-id", ADMIN_ID.to_string())
            .header("x-user-role", "admin"),
    }
}

pub async fn send(app: Router, method: Method, uri: &str, caller: Caller, body: Option<Value>) -> Response {
    let builder = with_identity(Request::builder().method(method).uri(uri), caller);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Caller::Anonymous, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Caller::Anonymous, Some(body)).await
}

pub async fn admin_get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Caller::Admin, None).await
}

pub async fn admin_post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Caller::Admin, Some(body)).await
}

pub async fn admin_put_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Caller::Admin, Some(body)).await
}

pub async fn admin_delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, Caller::Admin, None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn question(
    section_type: SectionType,
    service_id: Option<DbId>,
    text: &str,
    question_type: QuestionType,
    required: bool,
) -> CreateFormQuestion {
    CreateFormQuestion {
        section_type: Some(section_type),
        service_id,
        question_text: text.to_string(),
        question_type,
        required,
        placeholder: None,
        help_text: None,
    }
}

pub async fn create_question(
    pool: &PgPool,
    form_type: FormType,
    input: CreateFormQuestion,
) -> FormQuestion {
    mindak_api::engine::forms::create_question(pool, form_type, &input)
        .await
        .unwrap()
}

pub async fn create_option(pool: &PgPool, question_id: DbId, text: &str, value: &str) -> FormQuestionAnswer {
    let input = CreateFormQuestionAnswer {
        answer_text: text.to_string(),
        answer_value: value.to_string(),
    };
    mindak_api::engine::forms::create_option(pool, question_id, &input)
        .await
        .unwrap()
}

pub async fn create_service(pool: &PgPool, name: &str) -> Service {
    let input = CreateService {
        category_id: None,
        name: name.to_string(),
        description: None,
        price_cents: 10_000,
        is_active: None,
        display_order: None,
    };
    ServiceRepo::create(pool, &input).await.unwrap()
}

/// The podcast form used by the end-to-end tests: a required name (1), a
/// required email (2), and an optional "how did you hear" select (3) with
/// options Google/Friend.
pub struct PodcastForm {
    pub name: FormQuestion,
    pub email: FormQuestion,
    pub source: FormQuestion,
    pub google: FormQuestionAnswer,
    pub friend: FormQuestionAnswer,
}

pub async fn seed_podcast_form(pool: &PgPool) -> PodcastForm {
    let general = SectionType::General;
    let name = create_question(
        pool,
        FormType::Podcast,
        question(general, None, "Name", QuestionType::Text, true),
    )
    .await;
    let email = create_question(
        pool,
        FormType::Podcast,
        question(general, None, "Email", QuestionType::Email, true),
    )
    .await;
    let source = create_question(
        pool,
        FormType::Podcast,
        question(general, None, "How did you hear about us?", QuestionType::Select, false),
    )
    .await;
    let google = create_option(pool, source.id, "Google", "google").await;
    let friend = create_option(pool, source.id, "Friend", "friend").await;

    PodcastForm {
        name,
        email,
        source,
        google,
        friend,
    }
}

/// Answers for [`seed_podcast_form`] picking the given source option value.
pub fn podcast_answers(form: &PodcastForm, source: Option<&str>) -> Value {
    let mut answers = vec![
        json!({ "question_id": form.name.id, "value": "Ana" }),
        json!({ "question_id": form.email.id, "value": "ana@x.io" }),
    ];
    if let Some(source) = source {
        answers.push(json!({ "question_id": form.source.id, "value": source }));
    }
    json!({ "answers": answers })
}
