//! Reservation model.
//!
//! Podcast and service reservations share one table, discriminated by
//! `kind`; service reservations also carry the requested `service_ids`.

use mindak_core::error::CoreError;
use mindak_core::reservation::ReservationKind;
use mindak_core::snapshot::{AnsweredQuestionSnapshot, SubmittedAnswer};
use mindak_core::status::ReservationStatus;
use mindak_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `reservations` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reservation {
    pub id: DbId,
    pub kind: String,
    pub confirmation_id: String,
    pub client_id: Option<DbId>,
    pub status: String,
    pub client_answers: Json<Vec<AnsweredQuestionSnapshot>>,
    pub service_ids: Vec<DbId>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reservation {
    pub fn current_status(&self) -> Result<ReservationStatus, CoreError> {
        self.status.parse()
    }

    pub fn reservation_kind(&self) -> Result<ReservationKind, CoreError> {
        self.kind.parse()
    }
}

/// A reservation without its answer snapshot, for list views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReservationSummary {
    pub id: DbId,
    pub kind: String,
    pub confirmation_id: String,
    pub client_id: Option<DbId>,
    pub status: String,
    pub service_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public confirmation lookup: no answers, no client identity.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReservationConfirmation {
    pub confirmation_id: String,
    pub kind: String,
    pub status: String,
    pub created_at: Timestamp,
}

/// Everything needed to insert a reservation after its snapshot is built.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub kind: ReservationKind,
    pub confirmation_id: String,
    pub client_id: Option<DbId>,
    pub client_answers: Vec<AnsweredQuestionSnapshot>,
    pub service_ids: Vec<DbId>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Client submission of a podcast reservation.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitPodcastReservation {
    #[validate(length(max = 500))]
    pub answers: Vec<SubmittedAnswer>,
}

/// Client submission of a service reservation.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitServiceReservation {
    #[validate(length(min = 1, max = 20))]
    pub service_ids: Vec<DbId>,
    #[validate(length(max = 500))]
    pub answers: Vec<SubmittedAnswer>,
}

/// Admin status change request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReservationStatus {
    pub status: ReservationStatus,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
    /// Optional precondition: reject as a conflict if the stored status differs.
    pub expected_status: Option<ReservationStatus>,
}

/// Admin list filters.
#[derive(Debug, Default, Deserialize)]
pub struct ReservationListParams {
    pub status: Option<ReservationStatus>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// The answer snapshot plus client identity fields.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationClientData {
    pub reservation_id: DbId,
    pub confirmation_id: String,
    pub client_id: Option<DbId>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub client_answers: Vec<AnsweredQuestionSnapshot>,
}

impl From<Reservation> for ReservationClientData {
    fn from(r: Reservation) -> Self {
        Self {
            reservation_id: r.id,
            confirmation_id: r.confirmation_id,
            client_id: r.client_id,
            client_ip: r.client_ip,
            user_agent: r.user_agent,
            client_answers: r.client_answers.0,
        }
    }
}

/// Full admin view: the reservation, its audit trail, and its notes.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub status_history: Vec<super::status_history::StatusHistoryEntry>,
    pub notes: Vec<super::reservation_note::ReservationNote>,
}
