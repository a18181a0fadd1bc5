use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    LatencyUnit,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const REQUEST_ID_HEADER: &str = "x-request-id";

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod curation;
pub mod handlers;
pub mod models;
pub mod repository;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::{AppConfig, CurationConfig};
pub use curation::{CurationResult, CurationService, CurationStatus};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health, handlers::list_resources, handlers::get_resource, handlers::create_resource,
        handlers::update_resource, handlers::delete_resource, handlers::get_me,
        handlers::get_my_resources, handlers::get_review_queue, handlers::update_resource_status
    ),
    components(
        schemas(
            models::User, models::Resource, models::ResourceRequest, models::StatusUpdateRequest,
            models::CuratedResourceResponse, models::ResourcePage,
            curation::CurationStatus, curation::CurationResult,
        )
    ),
    tags(
        (name = "edu-marketplace", description = "Educational Resource Marketplace API")
    )
)]
struct ApiDoc;

/// CurationState
///
/// The shared, read-only curation orchestrator.
pub type CurationState = Arc<CurationService>;

/// AppState
///
/// The single, immutable container for every service the handlers need, shared across all
/// requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Curation Layer: heuristics plus provider classification for submitted content.
    pub curator: CurationState,
    /// Configuration: the loaded environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let handlers and extractors pull single components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for CurationState {
    fn from_ref(app_state: &AppState) -> CurationState {
        app_state.curator.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for `authenticated_routes`. Extracting `AuthUser` runs the JWT
/// validation and profile lookup; a failure rejects with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Builds the full route tree and wraps it in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let protected = authenticated::authenticated_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth_middleware),
    );

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(protected)
        // Admin handlers authenticate through the extractor and check the role themselves.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    // Request ids are assigned before the trace span opens so every log line carries one.
    let observability = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(PropagateRequestIdLayer::new(request_id));

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    app.layer(observability).layer(cors)
}

/// Span for one HTTP request, tagged with method, URI and the request id.
fn request_span(request: &axum::http::Request<axum::body::Body>) -> Span {
    let req_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %req_id,
    )
}
