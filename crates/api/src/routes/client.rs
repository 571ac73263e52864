//! Public client routes: forms, bookable services, submission, and
//! confirmation lookup. Identity is optional on every route here.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analytics, client_forms, reservations, services};
use crate::state::AppState;

/// Client routes, mounted at the API root.
///
/// ```text
/// GET    /forms/podcast                              -> get_podcast_form
/// GET    /forms/services                             -> get_services_form (?service_ids=1,2)
/// GET    /services/active                            -> list_active_services
/// POST   /reservations/podcast                       -> submit_podcast
/// POST   /reservations/service                       -> submit_service
/// GET    /reservations/confirmation/{confirmation_id} -> get_confirmation
/// POST   /analytics/events                           -> record_event
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forms/podcast", get(client_forms::get_podcast_form))
        .route("/forms/services", get(client_forms::get_services_form))
        .route("/services/active", get(services::list_active_services))
        .route("/reservations/podcast", post(reservations::submit_podcast))
        .route("/reservations/service", post(reservations::submit_service))
        .route(
            "/reservations/confirmation/{confirmation_id}",
            get(reservations::get_confirmation),
        )
        .route("/analytics/events", post(analytics::record_event))
}
