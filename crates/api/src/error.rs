use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mindak_core::error::CoreError;
use serde_json::{json, Map, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses:
///
/// ```text
/// { "error": "...", "code": "VALIDATION_ERROR", "field": "12", "details": { ... } }
/// ```
///
/// `field` and `details` are only present when there is something to say.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `mindak_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body failed `validator` shape checks.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] validator::ValidationErrors),

    /// A lookup by a non-numeric key found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine code, message, and optional extras of an error body.
struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<String>,
    details: Option<Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorBody::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(v) => ErrorBody {
                    field: v.field.clone(),
                    details: Some(json!({ "validation_code": v.code })),
                    ..ErrorBody::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", &v.message)
                },
                CoreError::InvalidTransition { from, to } => ErrorBody {
                    details: Some(json!({ "from": from, "to": to })),
                    ..ErrorBody::new(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "INVALID_TRANSITION",
                        core.to_string(),
                    )
                },
                CoreError::Conflict(msg) => {
                    ErrorBody::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    ErrorBody::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => {
                    ErrorBody::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorBody::internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::InvalidInput(errors) => ErrorBody {
                field: errors.field_errors().keys().min().map(|k| k.to_string()),
                details: serde_json::to_value(errors).ok(),
                ..ErrorBody::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Request body failed validation",
                )
            },
            AppError::NotFound(msg) => {
                ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody::internal()
            }
        };

        let mut map = Map::new();
        map.insert("error".into(), Value::String(body.message));
        map.insert("code".into(), Value::String(body.code.into()));
        if let Some(field) = body.field {
            map.insert("field".into(), Value::String(field));
        }
        if let Some(details) = body.details {
            map.insert("details".into(), details);
        }

        (body.status, axum::Json(Value::Object(map))).into_response()
    }
}

/// Classify a sqlx error into an HTTP error body.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorBody {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return ErrorBody::new(
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorBody::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorBody::internal()
        }
    }
}
