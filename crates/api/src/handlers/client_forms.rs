//! Public form endpoints: the active questions a client fills in.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::engine::forms::{podcast_form, services_form};
use crate::error::AppResult;
use crate::query::ServiceIdsParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /forms/podcast
pub async fn get_podcast_form(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let form = podcast_form(&state.pool).await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /forms/services?service_ids=1,2
///
/// The general section plus one section per requested service, in the
/// order the services were listed.
pub async fn get_services_form(
    State(state): State<AppState>,
    Query(params): Query<ServiceIdsParams>,
) -> AppResult<impl IntoResponse> {
    let ids = params.ids()?;
    let form = services_form(&state.pool, &ids).await?;
    Ok(Json(DataResponse { data: form }))
}
