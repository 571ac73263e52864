//! Admin service catalog routes. Mounted under `/admin`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{categories, services};
use crate::state::AppState;

/// Category and service routes.
///
/// ```text
/// GET    /categories                -> list_categories (?include_inactive)
/// POST   /categories                -> create_category
/// GET    /categories/{id}           -> get_category
/// PUT    /categories/{id}           -> update_category
/// DELETE /categories/{id}           -> delete_category
///
/// GET    /services                  -> list_services (?include_inactive, category_id)
/// POST   /services                  -> create_service
/// PUT    /services/bulk-status      -> bulk_update_status
/// GET    /services/{id}             -> get_service
/// PUT    /services/{id}             -> update_service
/// DELETE /services/{id}             -> delete_service (409 while referenced)
/// POST   /services/{id}/toggle      -> toggle_service_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route("/services/bulk-status", put(services::bulk_update_status))
        .route(
            "/services/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route("/services/{id}/toggle", post(services::toggle_service_status))
}
