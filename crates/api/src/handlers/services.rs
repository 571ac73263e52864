//! Handlers for the service catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use mindak_core::catalog::{normalize_description, validate_name, validate_price_cents};
use mindak_core::error::CoreError;
use mindak_core::types::DbId;
use mindak_db::models::service::{BulkServiceStatus, CreateService, ServiceListParams, UpdateService};
use mindak_db::repositories::{ServiceCategoryRepo, ServiceRepo};
use mindak_db::DbPool;

use crate::engine::catalog;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Service",
        id,
    }
}

async fn ensure_category_exists(pool: &DbPool, category_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = category_id {
        ServiceCategoryRepo::find_by_id(pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ServiceCategory",
                id,
            })?;
    }
    Ok(())
}

/// GET /services/active
///
/// Bookable services: active, in an active category or none.
pub async fn list_active_services(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let services = ServiceRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: services }))
}

/// GET /admin/services?include_inactive=&category_id=
pub async fn list_services(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ServiceListParams>,
) -> AppResult<impl IntoResponse> {
    let services = ServiceRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: services }))
}

/// GET /admin/services/{id}
pub async fn get_service(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: service }))
}

/// POST /admin/services
pub async fn create_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateService>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_price_cents(input.price_cents)?;
    ensure_category_exists(&state.pool, input.category_id).await?;
    let input = CreateService {
        name: validate_name(&input.name)?,
        description: normalize_description(input.description.as_deref())?,
        ..input
    };

    let service = ServiceRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = admin.user_id,
        service_id = service.id,
        name = %service.name,
        "Service created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: service })))
}

/// PUT /admin/services/{id}
pub async fn update_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateService>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(price) = input.price_cents {
        validate_price_cents(price)?;
    }
    ensure_category_exists(&state.pool, input.category_id).await?;
    let input = UpdateService {
        name: input.name.as_deref().map(validate_name).transpose()?,
        description: normalize_description(input.description.as_deref())?,
        ..input
    };

    let service = ServiceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(user_id = admin.user_id, service_id = id, "Service updated");
    Ok(Json(DataResponse { data: service }))
}

/// DELETE /admin/services/{id}
///
/// Refused with 409 while any reservation references the service.
pub async fn delete_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    catalog::delete_service(&state.pool, id).await?;

    tracing::info!(user_id = admin.user_id, service_id = id, "Service deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/services/{id}/toggle
pub async fn toggle_service_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::toggle_status(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        user_id = admin.user_id,
        service_id = id,
        is_active = service.is_active,
        "Service status toggled",
    );
    Ok(Json(DataResponse { data: service }))
}

/// PUT /admin/services/bulk-status
pub async fn bulk_update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkServiceStatus>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let services = catalog::bulk_set_status(&state.pool, &input.service_ids, input.is_active).await?;

    tracing::info!(user_id = admin.user_id, count = services.len(), "Services bulk-updated by admin");
    Ok(Json(DataResponse { data: services }))
}
