//! Repository for the append-only `reservation_notes` table.

use mindak_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::reservation_note::ReservationNote;

/// Column list for reservation_notes queries.
const COLUMNS: &str = "id, reservation_id, author_id, text, created_at";

pub struct ReservationNoteRepo;

impl ReservationNoteRepo {
    /// Append a note. `text` must already be validated and trimmed.
    pub async fn create(
        pool: &PgPool,
        reservation_id: DbId,
        author_id: DbId,
        text: &str,
    ) -> Result<ReservationNote, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservation_notes (reservation_id, author_id, text)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReservationNote>(&query)
            .bind(reservation_id)
            .bind(author_id)
            .bind(text)
            .fetch_one(pool)
            .await
    }

    /// Notes of a reservation, newest last.
    pub async fn list_for_reservation<'e, E: PgExecutor<'e>>(
        executor: E,
        reservation_id: DbId,
    ) -> Result<Vec<ReservationNote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservation_notes
             WHERE reservation_id = $1
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ReservationNote>(&query)
            .bind(reservation_id)
            .fetch_all(executor)
            .await
    }
}
