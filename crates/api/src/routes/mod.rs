pub mod analytics;
pub mod catalog;
pub mod client;
pub mod forms;
pub mod health;
pub mod reservations;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /forms/podcast                                    active podcast form (public)
/// /forms/services                                   active services form (public, ?service_ids)
/// /services/active                                  bookable services (public)
/// /reservations/podcast                             submit (POST, public)
/// /reservations/service                             submit (POST, public)
/// /reservations/confirmation/{confirmation_id}      status lookup (public)
/// /analytics/events                                 record view event (POST, public)
///
/// /admin/forms/{form_type}/questions                list, create (admin only)
/// /admin/forms/{form_type}/questions/reorder        reorder a group (PUT)
/// /admin/forms/{form_type}/questions/{id}           get, update, delete
/// /admin/questions/{question_id}/answers            list, create
/// /admin/questions/{question_id}/answers/reorder    reorder (PUT)
/// /admin/answers/{id}                               update, delete
/// /admin/answers/{id}/image                         upload image (POST multipart)
///
/// /admin/categories                                 list, create
/// /admin/categories/{id}                            get, update, delete
/// /admin/services                                   list, create
/// /admin/services/bulk-status                       bulk activate/deactivate (PUT)
/// /admin/services/{id}                              get, update, delete
/// /admin/services/{id}/toggle                       flip active flag (POST)
///
/// /admin/reservations/{kind}                        list
/// /admin/reservations/{kind}/{id}                   details, delete
/// /admin/reservations/{kind}/{id}/client-data       answer snapshot + identity
/// /admin/reservations/{kind}/{id}/status            transition (PUT)
/// /admin/reservations/{kind}/{id}/notes             list, add
///
/// /admin/analytics/dashboard                        totals and conversion
/// /admin/analytics/podcast                          podcast status counts
/// /admin/analytics/services                         service status counts + per service
/// /admin/analytics/trends                           bucketed volume
/// /admin/analytics/top-services                     most requested services
/// /admin/analytics/realtime                         pending counts and latest
/// ```
///
/// Admin routes check the role in their extractors (`RequireAdmin`), so
/// nesting here is purely structural.
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    let admin = Router::new()
        .merge(forms::questions_router())
        .merge(forms::answers_router(config.upload_max_bytes))
        .merge(catalog::router())
        .merge(reservations::router())
        .merge(analytics::router());

    Router::new()
        .merge(client::router())
        .nest("/admin", admin)
}
