//! Admin form editing routes. Mounted under `/admin`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{form_answers, forms};
use crate::state::AppState;

/// Multipart framing allowance on top of the image size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Question routes, per form type (`podcast` or `services`).
///
/// ```text
/// GET    /forms/{form_type}/questions           -> list_questions (?section_type, service_id, include_inactive)
/// POST   /forms/{form_type}/questions           -> create_question
/// PUT    /forms/{form_type}/questions/reorder   -> reorder_questions
/// GET    /forms/{form_type}/questions/{id}      -> get_question
/// PUT    /forms/{form_type}/questions/{id}      -> update_question
/// DELETE /forms/{form_type}/questions/{id}      -> delete_question
/// ```
pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/forms/{form_type}/questions",
            get(forms::list_questions).post(forms::create_question),
        )
        .route(
            "/forms/{form_type}/questions/reorder",
            put(forms::reorder_questions),
        )
        .route(
            "/forms/{form_type}/questions/{id}",
            get(forms::get_question)
                .put(forms::update_question)
                .delete(forms::delete_question),
        )
}

/// Answer option routes.
///
/// ```text
/// GET    /questions/{question_id}/answers          -> list_answers (?include_inactive)
/// POST   /questions/{question_id}/answers          -> create_answer
/// PUT    /questions/{question_id}/answers/reorder  -> reorder_answers
/// PUT    /answers/{id}                             -> update_answer
/// DELETE /answers/{id}                             -> delete_answer
/// POST   /answers/{id}/image                       -> upload_answer_image (multipart `image`)
/// ```
pub fn answers_router(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/questions/{question_id}/answers",
            get(form_answers::list_answers).post(form_answers::create_answer),
        )
        .route(
            "/questions/{question_id}/answers/reorder",
            put(form_answers::reorder_answers),
        )
        .route(
            "/answers/{id}",
            put(form_answers::update_answer).delete(form_answers::delete_answer),
        )
        .route(
            "/answers/{id}/image",
            post(form_answers::upload_answer_image).layer(DefaultBodyLimit::max(
                upload_max_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
}
