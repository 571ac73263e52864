//! Admin reservation routes, per kind (`podcast` or `service`). Mounted
//! under `/admin`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// ```text
/// GET    /reservations/{kind}                    -> list_reservations (?status, q, limit, offset)
/// GET    /reservations/{kind}/{id}               -> get_reservation
/// DELETE /reservations/{kind}/{id}               -> delete_reservation
/// GET    /reservations/{kind}/{id}/client-data   -> get_client_data
/// PUT    /reservations/{kind}/{id}/status        -> update_status
/// GET    /reservations/{kind}/{id}/notes         -> list_notes
/// POST   /reservations/{kind}/{id}/notes         -> add_note
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations/{kind}", get(reservations::list_reservations))
        .route(
            "/reservations/{kind}/{id}",
            get(reservations::get_reservation).delete(reservations::delete_reservation),
        )
        .route(
            "/reservations/{kind}/{id}/client-data",
            get(reservations::get_client_data),
        )
        .route(
            "/reservations/{kind}/{id}/status",
            put(reservations::update_status),
        )
        .route(
            "/reservations/{kind}/{id}/notes",
            get(reservations::list_notes).post(reservations::add_note),
        )
}
