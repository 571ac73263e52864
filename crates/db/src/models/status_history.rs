//! Reservation status history model.

use mindak_core::status::ReservationStatus;
use mindak_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reservation_status_history` table. Append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusHistoryEntry {
    pub id: DbId,
    pub reservation_id: DbId,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<DbId>,
    pub reason: Option<String>,
    pub changed_at: Timestamp,
}

/// A history record to append.
#[derive(Debug, Clone)]
pub struct NewStatusHistory<'a> {
    pub reservation_id: DbId,
    pub previous_status: Option<ReservationStatus>,
    pub new_status: ReservationStatus,
    pub changed_by: Option<DbId>,
    pub reason: Option<&'a str>,
}
