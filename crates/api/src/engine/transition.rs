//! Reservation status transitions.

use mindak_core::error::CoreError;
use mindak_core::notes::normalize_reason;
use mindak_core::reservation::ReservationKind;
use mindak_core::status::{check_expected_status, validate_transition, ReservationStatus};
use mindak_core::types::DbId;
use mindak_db::models::analytics::NewAnalyticsEvent;
use mindak_db::models::reservation::Reservation;
use mindak_db::models::status_history::NewStatusHistory;
use mindak_db::repositories::{AnalyticsRepo, ReservationRepo, StatusHistoryRepo};
use mindak_db::DbPool;
use serde_json::json;

use crate::error::AppResult;

/// An admin's request to move a reservation to another status.
#[derive(Debug)]
pub struct TransitionRequest<'a> {
    pub kind: ReservationKind,
    pub reservation_id: DbId,
    pub target: ReservationStatus,
    pub reason: Option<&'a str>,
    pub expected_status: Option<ReservationStatus>,
    pub changed_by: DbId,
}

/// Apply a status change together with its history record and analytics
/// event.
///
/// The status update is conditional on the version read at the start of the
/// transaction. If a concurrent transition commits first, the update matches
/// no row and this call fails with a conflict; exactly one of two racing
/// transitions wins and exactly one history record is written for it.
pub async fn transition_status(
    pool: &DbPool,
    request: TransitionRequest<'_>,
) -> AppResult<Reservation> {
    let reason = normalize_reason(request.reason)?;
    let kind = request.kind;

    let mut tx = pool.begin().await?;

    let current = ReservationRepo::find_by_id(&mut *tx, kind, request.reservation_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: kind.entity_name(),
            id: request.reservation_id,
        })?;
    let from = current.current_status()?;

    check_expected_status(from, request.expected_status)?;
    validate_transition(from, request.target)?;

    let updated = ReservationRepo::update_status(
        &mut *tx,
        current.id,
        current.version,
        request.target,
    )
    .await?
    .ok_or_else(|| {
        CoreError::Conflict(format!(
            "Reservation {} was modified concurrently. Refresh and retry.",
            current.id
        ))
    })?;

    StatusHistoryRepo::append(
        &mut *tx,
        &NewStatusHistory {
            reservation_id: updated.id,
            previous_status: Some(from),
            new_status: request.target,
            changed_by: Some(request.changed_by),
            reason: reason.as_deref(),
        },
    )
    .await?;

    AnalyticsRepo::record(
        &mut *tx,
        &NewAnalyticsEvent {
            event_type: request.target.event_type(),
            reservation_id: Some(updated.id),
            event_data: json!({
                "kind": kind,
                "confirmation_id": updated.confirmation_id,
                "from": from,
                "to": request.target,
            }),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        reservation_id = updated.id,
        kind = %kind,
        from = %from,
        to = %request.target,
        changed_by = request.changed_by,
        "Reservation status changed",
    );

    Ok(updated)
}
