//! Repository for the append-only `reservation_status_history` table.

use mindak_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::status_history::{NewStatusHistory, StatusHistoryEntry};

/// Column list for reservation_status_history queries.
const COLUMNS: &str =
    "id, reservation_id, previous_status, new_status, changed_by, reason, changed_at";

pub struct StatusHistoryRepo;

impl StatusHistoryRepo {
    /// Append one record. Always called in the same transaction as the
    /// status write it describes.
    pub async fn append(
        conn: &mut PgConnection,
        entry: &NewStatusHistory<'_>,
    ) -> Result<StatusHistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservation_status_history
                (reservation_id, previous_status, new_status, changed_by, reason)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(entry.reservation_id)
            .bind(entry.previous_status.map(|s| s.as_str()))
            .bind(entry.new_status.as_str())
            .bind(entry.changed_by)
            .bind(entry.reason)
            .fetch_one(conn)
            .await
    }

    /// History of a reservation, oldest first.
    pub async fn list_for_reservation<'e, E: PgExecutor<'e>>(
        executor: E,
        reservation_id: DbId,
    ) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservation_status_history
             WHERE reservation_id = $1
             ORDER BY changed_at, id"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(reservation_id)
            .fetch_all(executor)
            .await
    }
}
