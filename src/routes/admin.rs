use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Moderation endpoints. Authentication happens through the `AuthUser` extractor and the
/// `admin` role is checked inside each handler.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/resources?status=Pending
        // Review queue across all statuses.
        .route("/resources", get(handlers::get_review_queue))
        // PUT /admin/resources/{id}/status
        // Manual override of the curation verdict.
        .route(
            "/resources/{id}/status",
            put(handlers::update_resource_status),
        )
}
