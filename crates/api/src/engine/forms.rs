//! Form editing: question and option lifecycle, ordering, and the read
//! models served to clients.
//!
//! Every write that touches display order serializes on the affected group
//! first so the group stays contiguous from 1. Question writes take the
//! group's advisory lock (see [`FormQuestionRepo::lock_group`]) and then the
//! question row; option writes lock the parent question row, which every
//! option write of that question must take, before the option group.

use std::collections::HashMap;
use std::path::Path;

use mindak_core::error::{CoreError, ValidationError, INVALID_VALUE, QUESTION_WITHOUT_OPTIONS};
use mindak_core::forms::{
    compact_order, plan_reorder, validate_answer_option, validate_question_text, FormType,
    QuestionGroup, SectionType,
};
use mindak_core::reservation::normalize_service_selection;
use mindak_core::types::DbId;
use mindak_core::uploads::{public_url, storage_file_name, validate_image_upload, UPLOAD_URL_PREFIX};
use mindak_db::models::form_question::{
    CreateFormQuestion, FormQuestion, FormQuestionWithAnswers, QuestionReorderRequest,
    UpdateFormQuestion,
};
use mindak_db::models::form_question_answer::{
    CreateFormQuestionAnswer, FormQuestionAnswer, UpdateFormQuestionAnswer,
};
use mindak_db::repositories::{FormQuestionAnswerRepo, FormQuestionRepo, ServiceRepo};
use mindak_db::DbPool;
use serde::Serialize;
use sqlx::PgConnection;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::response::DeleteOutcome;

fn question_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "FormQuestion",
        id,
    }
}

fn option_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "FormQuestionAnswer",
        id,
    }
}

/// Fetch a question and check it belongs to `form_type`.
async fn find_question_in_form(
    pool: &DbPool,
    form_type: FormType,
    id: DbId,
) -> AppResult<FormQuestion> {
    FormQuestionRepo::find_by_id(pool, id)
        .await?
        .filter(|q| q.form_type == form_type.as_str())
        .ok_or_else(|| question_not_found(id).into())
}

/// Renumber the remaining active members of a question group.
async fn compact_question_group(conn: &mut PgConnection, group: &QuestionGroup) -> AppResult<()> {
    let remaining = FormQuestionRepo::lock_group(&mut *conn, group).await?;
    FormQuestionRepo::apply_order(conn, &compact_order(&remaining)).await?;
    Ok(())
}

async fn compact_option_group(conn: &mut PgConnection, question_id: DbId) -> AppResult<()> {
    let remaining = FormQuestionAnswerRepo::lock_group(&mut *conn, question_id).await?;
    FormQuestionAnswerRepo::apply_order(conn, &compact_order(&remaining)).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Attach options to each question, preserving question order.
pub async fn with_answers(
    pool: &DbPool,
    questions: Vec<FormQuestion>,
    include_inactive: bool,
) -> AppResult<Vec<FormQuestionWithAnswers>> {
    let ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();
    let mut by_question: HashMap<DbId, Vec<FormQuestionAnswer>> = HashMap::new();
    for answer in FormQuestionAnswerRepo::list_for_questions(pool, &ids, include_inactive).await? {
        by_question.entry(answer.question_id).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            FormQuestionWithAnswers { question, answers }
        })
        .collect())
}

/// Create a question at the end of its group.
pub async fn create_question(
    pool: &DbPool,
    form_type: FormType,
    input: &CreateFormQuestion,
) -> AppResult<FormQuestion> {
    validate_question_text(&input.question_text)?;
    let group = QuestionGroup::new(
        form_type,
        input.section_type.unwrap_or(SectionType::General),
        input.service_id,
    )?;
    if let Some(service_id) = group.service_id {
        ServiceRepo::find_by_id(pool, service_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Service",
                id: service_id,
            })?;
    }

    let mut tx = pool.begin().await?;
    let members = FormQuestionRepo::lock_group(&mut *tx, &group).await?;
    let next_order = members.iter().map(|(_, order)| *order).max().unwrap_or(0) + 1;
    let question = FormQuestionRepo::create(&mut *tx, &group, input, next_order).await?;
    tx.commit().await?;

    tracing::info!(
        question_id = question.id,
        form_type = %form_type,
        section_type = %group.section_type,
        service_id = ?group.service_id,
        display_order = next_order,
        "Form question created",
    );
    Ok(question)
}

/// Patch a question's text, type, and presentation fields.
pub async fn update_question(
    pool: &DbPool,
    form_type: FormType,
    id: DbId,
    input: &UpdateFormQuestion,
) -> AppResult<FormQuestion> {
    if let Some(text) = &input.question_text {
        validate_question_text(text)?;
    }
    find_question_in_form(pool, form_type, id).await?;

    let mut tx = pool.begin().await?;
    let question = FormQuestionRepo::update(&mut *tx, id, input)
        .await?
        .ok_or_else(|| question_not_found(id))?;
    tx.commit().await?;

    tracing::info!(question_id = id, form_type = %form_type, "Form question updated");
    Ok(question)
}

/// Delete a question.
///
/// A question some reservation snapshot answered is deactivated and kept;
/// otherwise it is removed together with its options. Either way the rest of
/// its group is renumbered to stay contiguous.
pub async fn delete_question(
    pool: &DbPool,
    form_type: FormType,
    id: DbId,
) -> AppResult<DeleteOutcome> {
    let question = find_question_in_form(pool, form_type, id).await?;
    let group = question.group()?;

    let mut tx = pool.begin().await?;
    // Lock the group in display order, then the row itself (already held
    // when the question is active).
    FormQuestionRepo::lock_group(&mut *tx, &group).await?;
    let question = FormQuestionRepo::lock_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| question_not_found(id))?;

    let outcome = if FormQuestionRepo::is_referenced(&mut *tx, id).await? {
        FormQuestionRepo::deactivate(&mut *tx, id).await?;
        DeleteOutcome::Deactivated
    } else {
        FormQuestionRepo::hard_delete(&mut *tx, id).await?;
        DeleteOutcome::Deleted
    };
    if question.is_active {
        compact_question_group(&mut *tx, &group).await?;
    }
    tx.commit().await?;

    tracing::info!(question_id = id, form_type = %form_type, outcome = ?outcome, "Form question deleted");
    Ok(outcome)
}

/// Rewrite the order of one question group. The request must list every
/// active member of the group exactly once.
pub async fn reorder_questions(
    pool: &DbPool,
    form_type: FormType,
    request: &QuestionReorderRequest,
) -> AppResult<Vec<FormQuestion>> {
    let group = QuestionGroup::new(
        form_type,
        request.section_type.unwrap_or(SectionType::General),
        request.service_id,
    )?;

    let mut tx = pool.begin().await?;
    let current: Vec<DbId> = FormQuestionRepo::lock_group(&mut *tx, &group)
        .await?
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    let plan = plan_reorder(&current, &request.ids)?;
    FormQuestionRepo::apply_order(&mut *tx, &plan).await?;
    let questions = FormQuestionRepo::list_active_group(&mut *tx, &group).await?;
    tx.commit().await?;

    tracing::info!(
        form_type = %form_type,
        section_type = %group.section_type,
        service_id = ?group.service_id,
        count = plan.len(),
        "Form questions reordered",
    );
    Ok(questions)
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Lock a question that options are being edited under.
async fn lock_question(conn: &mut PgConnection, question_id: DbId) -> AppResult<FormQuestion> {
    FormQuestionRepo::lock_by_id(conn, question_id)
        .await?
        .ok_or_else(|| question_not_found(question_id).into())
}

/// Create an option at the end of its question's option list.
pub async fn create_option(
    pool: &DbPool,
    question_id: DbId,
    input: &CreateFormQuestionAnswer,
) -> AppResult<FormQuestionAnswer> {
    validate_answer_option(&input.answer_text, &input.answer_value)?;

    let mut tx = pool.begin().await?;
    let question = lock_question(&mut *tx, question_id).await?;
    if !question.is_active {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "question_id",
            "Cannot add options to an inactive question",
        )
        .into());
    }
    if !question.kind()?.is_choice() {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "question_type",
            format!(
                "Questions of type '{}' do not take answer options",
                question.question_type
            ),
        )
        .into());
    }

    let members = FormQuestionAnswerRepo::lock_group(&mut *tx, question_id).await?;
    let next_order = members.iter().map(|(_, order)| *order).max().unwrap_or(0) + 1;
    let option = FormQuestionAnswerRepo::create(&mut *tx, question_id, input, next_order).await?;
    tx.commit().await?;

    tracing::info!(
        answer_id = option.id,
        question_id,
        display_order = next_order,
        "Answer option created",
    );
    Ok(option)
}

/// Patch an option's display text or stored value.
pub async fn update_option(
    pool: &DbPool,
    id: DbId,
    input: &UpdateFormQuestionAnswer,
) -> AppResult<FormQuestionAnswer> {
    let current = FormQuestionAnswerRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| option_not_found(id))?;
    validate_answer_option(
        input.answer_text.as_deref().unwrap_or(&current.answer_text),
        input.answer_value.as_deref().unwrap_or(&current.answer_value),
    )?;

    let option = FormQuestionAnswerRepo::update(pool, id, input)
        .await?
        .ok_or_else(|| option_not_found(id))?;

    tracing::info!(answer_id = id, question_id = option.question_id, "Answer option updated");
    Ok(option)
}

/// Delete an option.
///
/// An option some snapshot selected is deactivated and kept; otherwise it is
/// removed. Removing the last active option of an active required choice
/// question is refused, since the form would become unsubmittable.
pub async fn delete_option(pool: &DbPool, id: DbId) -> AppResult<DeleteOutcome> {
    let option = FormQuestionAnswerRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| option_not_found(id))?;

    let mut tx = pool.begin().await?;
    let question = lock_question(&mut *tx, option.question_id).await?;
    let active = FormQuestionAnswerRepo::lock_group(&mut *tx, question.id).await?;
    let option = FormQuestionAnswerRepo::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| option_not_found(id))?;

    let last_active = option.is_active && active.len() == 1;
    if last_active && question.is_active && question.required && question.kind()?.is_choice() {
        return Err(CoreError::Validation(
            ValidationError::new(
                QUESTION_WITHOUT_OPTIONS,
                "Cannot remove the last option of a required choice question",
            )
            .with_field(question.id),
        )
        .into());
    }

    let outcome = if FormQuestionAnswerRepo::is_referenced(&mut *tx, id).await? {
        FormQuestionAnswerRepo::deactivate(&mut *tx, id).await?;
        DeleteOutcome::Deactivated
    } else {
        FormQuestionAnswerRepo::hard_delete(&mut *tx, id).await?;
        DeleteOutcome::Deleted
    };
    if option.is_active {
        compact_option_group(&mut *tx, question.id).await?;
    }
    tx.commit().await?;

    tracing::info!(
        answer_id = id,
        question_id = question.id,
        outcome = ?outcome,
        "Answer option deleted",
    );
    Ok(outcome)
}

/// Rewrite the option order of one question.
pub async fn reorder_options(
    pool: &DbPool,
    question_id: DbId,
    ids: &[DbId],
) -> AppResult<Vec<FormQuestionAnswer>> {
    let mut tx = pool.begin().await?;
    lock_question(&mut *tx, question_id).await?;
    let current: Vec<DbId> = FormQuestionAnswerRepo::lock_group(&mut *tx, question_id)
        .await?
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    let plan = plan_reorder(&current, ids)?;
    FormQuestionAnswerRepo::apply_order(&mut *tx, &plan).await?;
    let options = FormQuestionAnswerRepo::list_for_questions(&mut *tx, &[question_id], false).await?;
    tx.commit().await?;

    tracing::info!(question_id, count = plan.len(), "Answer options reordered");
    Ok(options)
}

/// Store an uploaded image for an option and save its public reference.
///
/// The previous image, if it was one of ours, is removed after the new
/// reference is saved.
pub async fn store_option_image(
    pool: &DbPool,
    config: &ServerConfig,
    id: DbId,
    content_type: &str,
    bytes: &[u8],
) -> AppResult<FormQuestionAnswer> {
    let current = FormQuestionAnswerRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| option_not_found(id))?;
    let ext = validate_image_upload(content_type, bytes.len(), config.upload_max_bytes)?;

    let file_name = storage_file_name(id, ext);
    let path = config.upload_dir.join(&file_name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        AppError::InternalError(format!("Failed to store upload {}: {e}", path.display()))
    })?;

    let updated = match FormQuestionAnswerRepo::set_image_url(pool, id, &public_url(&file_name)).await {
        Ok(Some(updated)) => updated,
        other => {
            remove_upload(&path).await;
            return match other {
                Ok(_) => Err(option_not_found(id).into()),
                Err(e) => Err(e.into()),
            };
        }
    };

    if let Some(previous) = current
        .image_url
        .as_deref()
        .and_then(|url| url.strip_prefix(UPLOAD_URL_PREFIX))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|name| !name.contains('/'))
    {
        remove_upload(&config.upload_dir.join(previous)).await;
    }

    tracing::info!(
        answer_id = id,
        file = %file_name,
        bytes = bytes.len(),
        "Answer option image stored",
    );
    Ok(updated)
}

async fn remove_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove upload");
    }
}

// ---------------------------------------------------------------------------
// Client read models
// ---------------------------------------------------------------------------

/// The questions of one requested service.
#[derive(Debug, Serialize)]
pub struct ServiceFormSection {
    pub service_id: DbId,
    pub service_name: String,
    pub questions: Vec<FormQuestionWithAnswers>,
}

/// An active form as rendered to clients.
#[derive(Debug, Serialize)]
pub struct ClientForm {
    pub form_type: FormType,
    pub general: Vec<FormQuestionWithAnswers>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceFormSection>,
}

/// The active podcast form.
pub async fn podcast_form(pool: &DbPool) -> AppResult<ClientForm> {
    let general =
        FormQuestionRepo::list_active_group(pool, &QuestionGroup::general(FormType::Podcast)).await?;
    Ok(ClientForm {
        form_type: FormType::Podcast,
        general: with_answers(pool, general, false).await?,
        services: Vec::new(),
    })
}

/// The active services form for the given services, in request order.
/// An empty selection yields only the general section.
pub async fn services_form(pool: &DbPool, service_ids: &[DbId]) -> AppResult<ClientForm> {
    let general =
        FormQuestionRepo::list_active_group(pool, &QuestionGroup::general(FormType::Services)).await?;
    let general = with_answers(pool, general, false).await?;
    if service_ids.is_empty() {
        return Ok(ClientForm {
            form_type: FormType::Services,
            general,
            services: Vec::new(),
        });
    }

    let service_ids = normalize_service_selection(service_ids)?;
    let services = ServiceRepo::find_active_by_ids(pool, &service_ids).await?;
    let names: HashMap<DbId, String> = services.into_iter().map(|s| (s.id, s.name)).collect();
    if let Some(missing) = service_ids.iter().find(|id| !names.contains_key(*id)) {
        return Err(CoreError::NotFound {
            entity: "Service",
            id: *missing,
        }
        .into());
    }

    let specific = FormQuestionRepo::list_active_for_services(pool, &service_ids).await?;
    let mut specific = with_answers(pool, specific, false).await?;

    let mut sections = Vec::with_capacity(service_ids.len());
    for service_id in &service_ids {
        let (questions, rest): (Vec<_>, Vec<_>) = specific
            .into_iter()
            .partition(|q| q.question.service_id == Some(*service_id));
        specific = rest;
        sections.push(ServiceFormSection {
            service_id: *service_id,
            service_name: names.get(service_id).cloned().unwrap_or_default(),
            questions,
        });
    }

    Ok(ClientForm {
        form_type: FormType::Services,
        general,
        services: sections,
    })
}
