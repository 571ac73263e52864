//! Admin analytics routes. Mounted under `/admin`.

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// ```text
/// GET    /analytics/dashboard      -> dashboard
/// GET    /analytics/podcast        -> podcast_analytics (?start_date, end_date)
/// GET    /analytics/services       -> service_analytics (?start_date, end_date)
/// GET    /analytics/trends         -> trends (?interval, kind, start_date, end_date)
/// GET    /analytics/top-services   -> top_services (?limit, start_date, end_date)
/// GET    /analytics/realtime       -> realtime
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route("/analytics/podcast", get(analytics::podcast_analytics))
        .route("/analytics/services", get(analytics::service_analytics))
        .route("/analytics/trends", get(analytics::trends))
        .route("/analytics/top-services", get(analytics::top_services))
        .route("/analytics/realtime", get(analytics::realtime))
}
