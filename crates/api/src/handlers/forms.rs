//! Admin handlers for form questions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use mindak_core::error::CoreError;
use mindak_core::forms::FormType;
use mindak_core::types::DbId;
use mindak_db::models::form_question::{
    CreateFormQuestion, QuestionListParams, QuestionReorderRequest, UpdateFormQuestion,
};
use mindak_db::repositories::FormQuestionRepo;

use crate::engine::forms;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, DeleteResult};
use crate::state::AppState;

/// GET /admin/forms/{form_type}/questions
///
/// Questions with their options, grouped by section and service. Inactive
/// questions (and options) are included when `include_inactive=true`.
pub async fn list_questions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(form_type): Path<FormType>,
    Query(params): Query<QuestionListParams>,
) -> AppResult<impl IntoResponse> {
    let include_inactive = params.include_inactive.unwrap_or(false);
    let questions = FormQuestionRepo::list(&state.pool, form_type, &params).await?;
    let questions = forms::with_answers(&state.pool, questions, include_inactive).await?;
    Ok(Json(DataResponse { data: questions }))
}

/// GET /admin/forms/{form_type}/questions/{id}
pub async fn get_question(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((form_type, id)): Path<(FormType, DbId)>,
) -> AppResult<impl IntoResponse> {
    let not_found = || CoreError::NotFound {
        entity: "FormQuestion",
        id,
    };
    let question = FormQuestionRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|q| q.form_type == form_type.as_str())
        .ok_or_else(not_found)?;
    let question = forms::with_answers(&state.pool, vec![question], true)
        .await?
        .pop()
        .ok_or_else(not_found)?;
    Ok(Json(DataResponse { data: question }))
}

/// POST /admin/forms/{form_type}/questions
pub async fn create_question(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(form_type): Path<FormType>,
    Json(input): Json<CreateFormQuestion>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let question = forms::create_question(&state.pool, form_type, &input).await?;

    tracing::info!(user_id = admin.user_id, question_id = question.id, "Question created by admin");
    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// PUT /admin/forms/{form_type}/questions/{id}
pub async fn update_question(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((form_type, id)): Path<(FormType, DbId)>,
    Json(input): Json<UpdateFormQuestion>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let question = forms::update_question(&state.pool, form_type, id, &input).await?;

    tracing::info!(user_id = admin.user_id, question_id = id, "Question updated by admin");
    Ok(Json(DataResponse { data: question }))
}

/// DELETE /admin/forms/{form_type}/questions/{id}
///
/// Responds with whether the question was deactivated (still referenced by
/// stored answers) or deleted.
pub async fn delete_question(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((form_type, id)): Path<(FormType, DbId)>,
) -> AppResult<impl IntoResponse> {
    let outcome = forms::delete_question(&state.pool, form_type, id).await?;

    tracing::info!(user_id = admin.user_id, question_id = id, outcome = ?outcome, "Question removed by admin");
    Ok(Json(DataResponse {
        data: DeleteResult { id, outcome },
    }))
}

/// PUT /admin/forms/{form_type}/questions/reorder
///
/// Body: `{ "section_type"?, "service_id"?, "ids": [..] }`. The id list must
/// be exactly the active members of the group.
pub async fn reorder_questions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(form_type): Path<FormType>,
    Json(input): Json<QuestionReorderRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let questions = forms::reorder_questions(&state.pool, form_type, &input).await?;

    tracing::info!(user_id = admin.user_id, form_type = %form_type, "Questions reordered by admin");
    Ok(Json(DataResponse { data: questions }))
}
