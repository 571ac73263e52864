//! Admin handlers for the answer options of choice questions.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use mindak_core::error::CoreError;
use mindak_core::types::DbId;
use mindak_db::models::form_question::ReorderRequest;
use mindak_db::models::form_question_answer::{CreateFormQuestionAnswer, UpdateFormQuestionAnswer};
use mindak_db::repositories::{FormQuestionAnswerRepo, FormQuestionRepo};

use crate::engine::forms;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::{DataResponse, DeleteResult};
use crate::state::AppState;

/// GET /admin/questions/{question_id}/answers
pub async fn list_answers(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    FormQuestionRepo::find_by_id(&state.pool, question_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "FormQuestion",
            id: question_id,
        })?;
    let answers =
        FormQuestionAnswerRepo::list_for_question(&state.pool, question_id, params.include_inactive)
            .await?;
    Ok(Json(DataResponse { data: answers }))
}

/// POST /admin/questions/{question_id}/answers
pub async fn create_answer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    Json(input): Json<CreateFormQuestionAnswer>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let answer = forms::create_option(&state.pool, question_id, &input).await?;

    tracing::info!(user_id = admin.user_id, answer_id = answer.id, "Answer option created by admin");
    Ok((StatusCode::CREATED, Json(DataResponse { data: answer })))
}

/// PUT /admin/questions/{question_id}/answers/reorder
pub async fn reorder_answers(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(question_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let answers = forms::reorder_options(&state.pool, question_id, &input.ids).await?;

    tracing::info!(user_id = admin.user_id, question_id, "Answer options reordered by admin");
    Ok(Json(DataResponse { data: answers }))
}

/// PUT /admin/answers/{id}
pub async fn update_answer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFormQuestionAnswer>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let answer = forms::update_option(&state.pool, id, &input).await?;

    tracing::info!(user_id = admin.user_id, answer_id = id, "Answer option updated by admin");
    Ok(Json(DataResponse { data: answer }))
}

/// DELETE /admin/answers/{id}
pub async fn delete_answer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = forms::delete_option(&state.pool, id).await?;

    tracing::info!(user_id = admin.user_id, answer_id = id, outcome = ?outcome, "Answer option removed by admin");
    Ok(Json(DataResponse {
        data: DeleteResult { id, outcome },
    }))
}

/// POST /admin/answers/{id}/image
///
/// Multipart upload with a single required `image` field. The content type
/// of the part decides the stored extension.
pub async fn upload_answer_image(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or("").to_ascii_lowercase();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        image = Some((content_type, data.to_vec()));
    }

    let (content_type, data) =
        image.ok_or_else(|| AppError::BadRequest("Missing required 'image' field".into()))?;

    let answer =
        forms::store_option_image(&state.pool, &state.config, id, &content_type, &data).await?;

    tracing::info!(user_id = admin.user_id, answer_id = id, "Answer option image uploaded by admin");
    Ok(Json(DataResponse { data: answer }))
}
