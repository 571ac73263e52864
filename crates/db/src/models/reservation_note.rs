//! Reservation note model.

use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `reservation_notes` table. Append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReservationNote {
    pub id: DbId,
    pub reservation_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub created_at: Timestamp,
}

/// DTO for adding a note.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationNote {
    #[validate(length(max = 10000))]
    pub text: String,
}
