//! Reservation handlers: client submission and confirmation lookup, plus the
//! admin views and status workflow for both reservation kinds.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use mindak_core::error::CoreError;
use mindak_core::notes::validate_note_text;
use mindak_core::reservation::{is_confirmation_id, ReservationKind};
use mindak_core::types::DbId;
use mindak_db::models::reservation::{
    Reservation, ReservationClientData, ReservationConfirmation, ReservationDetails,
    ReservationListParams, SubmitPodcastReservation, SubmitServiceReservation,
    UpdateReservationStatus,
};
use mindak_db::models::reservation_note::CreateReservationNote;
use mindak_db::repositories::{ReservationNoteRepo, ReservationRepo, StatusHistoryRepo};
use mindak_db::DbPool;

use crate::engine::submission::{submit_reservation, Submission};
use crate::engine::transition::{transition_status, TransitionRequest};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::middleware::client::ClientContext;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

async fn find_reservation(pool: &DbPool, kind: ReservationKind, id: DbId) -> AppResult<Reservation> {
    ReservationRepo::find_by_id(pool, kind, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: kind.entity_name(),
                id,
            })
        })
}

fn confirmation(reservation: &Reservation) -> ReservationConfirmation {
    ReservationConfirmation {
        confirmation_id: reservation.confirmation_id.clone(),
        kind: reservation.kind.clone(),
        status: reservation.status.clone(),
        created_at: reservation.created_at,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// POST /reservations/podcast
///
/// Anonymous submissions are accepted; an identified caller is recorded as
/// the client.
pub async fn submit_podcast(
    user: MaybeUser,
    client: ClientContext,
    State(state): State<AppState>,
    Json(input): Json<SubmitPodcastReservation>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let reservation = submit_reservation(
        &state.pool,
        &state.config,
        Submission {
            kind: ReservationKind::Podcast,
            client_id: user.user_id(),
            service_ids: &[],
            answers: &input.answers,
            client: &client,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: confirmation(&reservation),
        }),
    ))
}

/// POST /reservations/service
pub async fn submit_service(
    user: MaybeUser,
    client: ClientContext,
    State(state): State<AppState>,
    Json(input): Json<SubmitServiceReservation>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let reservation = submit_reservation(
        &state.pool,
        &state.config,
        Submission {
            kind: ReservationKind::Service,
            client_id: user.user_id(),
            service_ids: &input.service_ids,
            answers: &input.answers,
            client: &client,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: confirmation(&reservation),
        }),
    ))
}

/// GET /reservations/confirmation/{confirmation_id}
///
/// Status lookup by confirmation id. Never exposes answers or identity.
pub async fn get_confirmation(
    State(state): State<AppState>,
    Path(confirmation_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let not_found =
        || AppError::NotFound(format!("Reservation with confirmation id {confirmation_id} not found"));
    if !is_confirmation_id(&confirmation_id) {
        return Err(not_found());
    }
    let found = ReservationRepo::find_confirmation(&state.pool, &confirmation_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(DataResponse { data: found }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /admin/reservations/{kind}?status=&q=&limit=&offset=
pub async fn list_reservations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<ReservationKind>,
    Query(params): Query<ReservationListParams>,
) -> AppResult<impl IntoResponse> {
    let reservations = ReservationRepo::list(&state.pool, kind, &params).await?;
    Ok(Json(DataResponse { data: reservations }))
}

/// GET /admin/reservations/{kind}/{id}
///
/// The reservation with its status history (oldest first) and notes.
pub async fn get_reservation(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReservationKind, DbId)>,
) -> AppResult<impl IntoResponse> {
    let reservation = find_reservation(&state.pool, kind, id).await?;
    let status_history = StatusHistoryRepo::list_for_reservation(&state.pool, id).await?;
    let notes = ReservationNoteRepo::list_for_reservation(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: ReservationDetails {
            reservation,
            status_history,
            notes,
        },
    }))
}

/// GET /admin/reservations/{kind}/{id}/client-data
pub async fn get_client_data(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReservationKind, DbId)>,
) -> AppResult<impl IntoResponse> {
    let reservation = find_reservation(&state.pool, kind, id).await?;
    Ok(Json(DataResponse {
        data: ReservationClientData::from(reservation),
    }))
}

/// PUT /admin/reservations/{kind}/{id}/status
///
/// Body: `{ "status", "reason"?, "expected_status"? }`. Transitions outside
/// the allowed table answer 422; a concurrent change answers 409.
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReservationKind, DbId)>,
    Json(input): Json<UpdateReservationStatus>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let reservation = transition_status(
        &state.pool,
        TransitionRequest {
            kind,
            reservation_id: id,
            target: input.status,
            reason: input.reason.as_deref(),
            expected_status: input.expected_status,
            changed_by: admin.user_id,
        },
    )
    .await?;
    Ok(Json(DataResponse { data: reservation }))
}

/// GET /admin/reservations/{kind}/{id}/notes
pub async fn list_notes(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReservationKind, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_reservation(&state.pool, kind, id).await?;
    let notes = ReservationNoteRepo::list_for_reservation(&state.pool, id).await?;
    Ok(Json(DataResponse { data: notes }))
}

/// POST /admin/reservations/{kind}/{id}/notes
pub async fn add_note(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReservationKind, DbId)>,
    Json(input): Json<CreateReservationNote>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let text = validate_note_text(&input.text)?;
    find_reservation(&state.pool, kind, id).await?;

    let note = ReservationNoteRepo::create(&state.pool, id, admin.user_id, &text).await?;

    tracing::info!(
        user_id = admin.user_id,
        reservation_id = id,
        note_id = note.id,
        "Reservation note added",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// DELETE /admin/reservations/{kind}/{id}
///
/// Hard delete; history and notes go with it.
pub async fn delete_reservation(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReservationKind, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !ReservationRepo::delete(&state.pool, kind, id).await? {
        return Err(CoreError::NotFound {
            entity: kind.entity_name(),
            id,
        }
        .into());
    }

    tracing::info!(user_id = admin.user_id, reservation_id = id, kind = %kind, "Reservation deleted");
    Ok(StatusCode::NO_CONTENT)
}
