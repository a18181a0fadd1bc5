use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes for any user who passed the authentication layer. Every handler receives a
/// validated `AuthUser`, used for the owner-only checks on update and delete.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(handlers::get_me))
        // GET /me/resources
        // The caller's own resources, including Pending and Rejected ones.
        .route("/me/resources", get(handlers::get_my_resources))
        // POST /resources
        // Submission runs curation; the verdict becomes the stored status.
        .route("/resources", post(handlers::create_resource))
        // PUT/DELETE /resources/{id}
        // Creator only. An update re-runs curation.
        .route(
            "/resources/{id}",
            put(handlers::update_resource).delete(handlers::delete_resource),
        )
}
