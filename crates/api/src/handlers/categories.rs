//! Admin handlers for service categories.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use mindak_core::catalog::{normalize_description, validate_name};
use mindak_core::error::CoreError;
use mindak_core::types::DbId;
use mindak_db::models::service_category::{CreateServiceCategory, UpdateServiceCategory};
use mindak_db::repositories::ServiceCategoryRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "ServiceCategory",
        id,
    }
}

/// GET /admin/categories
pub async fn list_categories(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let categories = ServiceCategoryRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /admin/categories/{id}
pub async fn get_category(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = ServiceCategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: category }))
}

/// POST /admin/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateServiceCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let input = CreateServiceCategory {
        name: validate_name(&input.name)?,
        description: normalize_description(input.description.as_deref())?,
        is_active: input.is_active,
    };
    let category = ServiceCategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = admin.user_id, category_id = category.id, name = %category.name, "Service category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /admin/categories/{id}
pub async fn update_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateServiceCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let input = UpdateServiceCategory {
        name: input.name.as_deref().map(validate_name).transpose()?,
        description: normalize_description(input.description.as_deref())?,
        is_active: input.is_active,
    };
    let category = ServiceCategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(user_id = admin.user_id, category_id = id, "Service category updated");
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /admin/categories/{id}
///
/// Services in the category are kept and become uncategorized.
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ServiceCategoryRepo::delete(&state.pool, id).await? {
        return Err(not_found(id).into());
    }

    tracing::info!(user_id = admin.user_id, category_id = id, "Service category deleted");
    Ok(StatusCode::NO_CONTENT)
}
