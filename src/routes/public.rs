use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that are **unauthenticated** and open to any client. Resource reads here only
/// ever expose Approved resources; the status gate lives in the handler's query.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers; checks the database too.
        .route("/health", get(handlers::health))
        // GET /resources?theme=&level=&language=&format=&limit=&offset=
        .route("/resources", get(handlers::list_resources))
        // GET /resources/{id}
        // 404 unless the resource is Approved.
        .route("/resources/{id}", get(handlers::get_resource))
}
