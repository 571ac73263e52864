//! Reservation submission: snapshot the answers, allocate a confirmation id,
//! and write the reservation with its first history record.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use mindak_core::analytics::EVENT_RESERVATION_SUBMITTED;
use mindak_core::error::CoreError;
use mindak_core::forms::{OptionDef, QuestionDef, QuestionGroup};
use mindak_core::reservation::{
    format_confirmation_id, normalize_service_selection, ReservationKind,
};
use mindak_core::snapshot::{build_snapshot, ActiveForm, SubmittedAnswer};
use mindak_core::status::ReservationStatus;
use mindak_core::types::DbId;
use mindak_db::models::analytics::NewAnalyticsEvent;
use mindak_db::models::form_question::FormQuestion;
use mindak_db::models::reservation::{NewReservation, Reservation};
use mindak_db::models::status_history::NewStatusHistory;
use mindak_db::repositories::{
    AnalyticsRepo, FormQuestionAnswerRepo, FormQuestionRepo, ReservationRepo, ServiceRepo,
    StatusHistoryRepo,
};
use mindak_db::DbPool;
use serde_json::json;
use sqlx::PgConnection;

use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::middleware::client::ClientContext;

/// A validated-at-the-edge client submission.
#[derive(Debug)]
pub struct Submission<'a> {
    pub kind: ReservationKind,
    pub client_id: Option<DbId>,
    /// Requested services; must be empty for podcast reservations.
    pub service_ids: &'a [DbId],
    pub answers: &'a [SubmittedAnswer],
    pub client: &'a ClientContext,
}

/// Create a reservation in `pending` status.
///
/// Loading the live definitions, drawing the confirmation counter, inserting
/// the reservation and appending the `null -> pending` history record all
/// happen in one transaction. A rejected submission writes nothing; the
/// sequence value it may have drawn is simply skipped.
pub async fn submit_reservation(
    pool: &DbPool,
    config: &ServerConfig,
    submission: Submission<'_>,
) -> AppResult<Reservation> {
    let kind = submission.kind;
    let service_ids = match kind {
        ReservationKind::Service => normalize_service_selection(submission.service_ids)?,
        ReservationKind::Podcast => Vec::new(),
    };

    let mut tx = pool.begin().await?;

    let form = load_active_form(&mut *tx, kind, &service_ids).await?;
    let snapshot = build_snapshot(&form, submission.answers)?;

    let sequence = ReservationRepo::next_confirmation_sequence(&mut *tx, kind).await?;
    let confirmation_id = format_confirmation_id(
        config.confirmation_prefix(kind),
        Utc::now().year(),
        sequence,
    );

    let new = NewReservation {
        kind,
        confirmation_id,
        client_id: submission.client_id,
        client_answers: snapshot,
        service_ids,
        client_ip: submission.client.ip.clone(),
        user_agent: submission.client.user_agent.clone(),
    };
    let reservation = ReservationRepo::insert(&mut *tx, &new).await?;

    StatusHistoryRepo::append(
        &mut *tx,
        &NewStatusHistory {
            reservation_id: reservation.id,
            previous_status: None,
            new_status: ReservationStatus::Pending,
            changed_by: submission.client_id,
            reason: None,
        },
    )
    .await?;

    AnalyticsRepo::record(
        &mut *tx,
        &NewAnalyticsEvent {
            event_type: EVENT_RESERVATION_SUBMITTED,
            reservation_id: Some(reservation.id),
            event_data: json!({
                "kind": kind,
                "confirmation_id": reservation.confirmation_id,
                "service_ids": reservation.service_ids,
                "answer_count": reservation.client_answers.0.len(),
            }),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        reservation_id = reservation.id,
        confirmation_id = %reservation.confirmation_id,
        kind = %kind,
        client_id = ?submission.client_id,
        answers = reservation.client_answers.0.len(),
        "Reservation submitted",
    );

    Ok(reservation)
}

/// Load the active question set a submission of `kind` is validated against.
///
/// For service reservations this is the general section followed by each
/// requested service's section in request order. Every requested service
/// must exist and be bookable.
pub async fn load_active_form(
    conn: &mut PgConnection,
    kind: ReservationKind,
    service_ids: &[DbId],
) -> AppResult<ActiveForm> {
    let general = FormQuestionRepo::list_active_group(
        &mut *conn,
        &QuestionGroup::general(kind.form_type()),
    )
    .await?;

    let mut service_names: HashMap<DbId, String> = HashMap::new();
    let mut specific = Vec::new();
    if !service_ids.is_empty() {
        let services = ServiceRepo::find_active_by_ids(&mut *conn, service_ids).await?;
        service_names = services.into_iter().map(|s| (s.id, s.name)).collect();
        if let Some(missing) = service_ids.iter().find(|id| !service_names.contains_key(*id)) {
            return Err(CoreError::NotFound {
                entity: "Service",
                id: *missing,
            }
            .into());
        }
        specific = FormQuestionRepo::list_active_for_services(&mut *conn, service_ids).await?;
    }

    let question_ids: Vec<DbId> = general.iter().chain(&specific).map(|q| q.id).collect();
    let mut options: HashMap<DbId, Vec<OptionDef>> = HashMap::new();
    for answer in FormQuestionAnswerRepo::list_for_questions(&mut *conn, &question_ids, false).await? {
        options
            .entry(answer.question_id)
            .or_default()
            .push(answer.to_def());
    }

    let to_defs = |questions: Vec<&FormQuestion>,
                   options: &mut HashMap<DbId, Vec<OptionDef>>|
     -> Result<Vec<QuestionDef>, CoreError> {
        questions
            .into_iter()
            .map(|q| {
                let name = q.service_id.and_then(|id| service_names.get(&id).cloned());
                q.to_def(name, options.remove(&q.id).unwrap_or_default())
            })
            .collect()
    };

    let general_defs = to_defs(general.iter().collect(), &mut options)?;
    let mut sections = Vec::with_capacity(service_ids.len());
    for service_id in service_ids {
        let section: Vec<&FormQuestion> = specific
            .iter()
            .filter(|q| q.service_id == Some(*service_id))
            .collect();
        sections.push(to_defs(section, &mut options)?);
    }

    Ok(ActiveForm::assemble(general_defs, sections))
}
