use crate::{
    AppState,
    auth::AuthUser,
    curation::CurationStatus,
    models::{
        CuratedResourceResponse, Resource, ResourcePage, ResourceQuery, ResourceRequest,
        StatusUpdateRequest, User,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, de};
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 200;

// --- Filter Structs ---

/// ResourceFilter
///
/// Query parameters accepted by the public listing (GET /resources). Unknown parameters are
/// rejected with 400 so that misspelled filters do not silently return everything.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(deny_unknown_fields)]
pub struct ResourceFilter {
    /// Page size, 1..=200 (default 50).
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    /// Rows to skip, 0 or greater.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub offset: Option<i64>,
    pub theme: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub format: Option<String>,
}

/// ReviewQueueFilter
///
/// Query parameters for the admin review queue (GET /admin/resources). Same as
/// `ResourceFilter` plus an optional status.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(deny_unknown_fields)]
pub struct ReviewQueueFilter {
    /// Approved, Pending or Rejected (case-insensitive). Omit for all.
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub offset: Option<i64>,
    pub theme: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub format: Option<String>,
}

impl ResourceFilter {
    /// Public listings only ever see Approved resources.
    pub fn into_query(self) -> Result<ResourceQuery, StatusCode> {
        build_query(
            Some(CurationStatus::Approved),
            [self.theme, self.level, self.language, self.format],
            self.limit,
            self.offset,
        )
    }
}

impl ReviewQueueFilter {
    pub fn into_query(self) -> Result<ResourceQuery, StatusCode> {
        let status = match normalize_filter(self.status)? {
            Some(raw) => Some(CurationStatus::parse_loose(&raw).ok_or(StatusCode::BAD_REQUEST)?),
            None => None,
        };
        build_query(
            status,
            [self.theme, self.level, self.language, self.format],
            self.limit,
            self.offset,
        )
    }
}

/// `?limit=` reads as "use the default"; anything else must be an integer.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => raw.parse::<i64>().map(Some).map_err(de::Error::custom),
    }
}

/// An empty parameter means "no filter"; a whitespace-only one is a client error.
fn normalize_filter(value: Option<String>) -> Result<Option<String>, StatusCode> {
    match value {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(StatusCode::BAD_REQUEST)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

fn build_query(
    status: Option<CurationStatus>,
    [theme, level, language, format]: [Option<String>; 4],
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<ResourceQuery, StatusCode> {
    let limit = match limit {
        None => DEFAULT_PAGE_LIMIT,
        Some(n) if (1..=MAX_PAGE_LIMIT).contains(&n) => n,
        Some(_) => return Err(StatusCode::BAD_REQUEST),
    };
    let offset = match offset {
        None => 0,
        Some(n) if n >= 0 => n,
        Some(_) => return Err(StatusCode::BAD_REQUEST),
    };

    Ok(ResourceQuery {
        status,
        theme: normalize_filter(theme)?,
        level: normalize_filter(level)?,
        language: normalize_filter(language)?,
        format: normalize_filter(format)?,
        limit,
        offset,
    })
}

// --- Public Handlers ---

/// health
///
/// [Public Route] Liveness plus a database round trip. 503 when the database is unreachable.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Healthy"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.repo.ping().await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}

/// list_resources
///
/// [Public Route] Lists Approved resources with filtering and pagination.
#[utoipa::path(
    get,
    path = "/resources",
    params(ResourceFilter),
    responses(
        (status = 200, description = "Approved resources", body = ResourcePage),
        (status = 400, description = "Invalid filter or pagination")
    )
)]
pub async fn list_resources(
    State(state): State<AppState>,
    Query(filter): Query<ResourceFilter>,
) -> Result<Json<ResourcePage>, StatusCode> {
    let query = filter.into_query()?;
    Ok(Json(state.repo.list_resources(query).await))
}

/// get_resource
///
/// [Public Route] Retrieves a single resource. Anything not Approved is reported as 404.
#[utoipa::path(
    get,
    path = "/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Found", body = Resource),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Resource>, StatusCode> {
    state
        .repo
        .get_public_resource(id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- Authenticated Handlers ---

/// create_resource
///
/// [Authenticated Route] Submits a new resource. The content is curated first and the
/// verdict becomes the stored status. Curation never fails the request; a provider outage
/// only means the resource lands in Pending.
#[utoipa::path(
    post,
    path = "/resources",
    request_body = ResourceRequest,
    responses(
        (status = 201, description = "Created", body = CuratedResourceResponse),
        (status = 400, description = "Missing title or content")
    )
)]
pub async fn create_resource(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ResourceRequest>,
) -> Result<(StatusCode, Json<CuratedResourceResponse>), StatusCode> {
    if !payload.is_valid() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let curation = state
        .curator
        .curate_content(
            &payload.title,
            &payload.content,
            &payload.language,
            &payload.format,
        )
        .await;

    let resource = state
        .repo
        .create_resource(payload, id, curation.status)
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    tracing::info!(resource_id = %resource.id, status = %resource.status, "resource created");

    Ok((
        StatusCode::CREATED,
        Json(CuratedResourceResponse { resource, curation }),
    ))
}

/// update_resource
///
/// [Authenticated Route] Replaces a resource's content and re-runs curation.
///
/// *Authorization*: creator only. Ownership is checked before curation so a foreign
/// request never costs a provider call.
#[utoipa::path(
    put,
    path = "/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    request_body = ResourceRequest,
    responses(
        (status = 200, description = "Updated", body = CuratedResourceResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_resource(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResourceRequest>,
) -> Result<Json<CuratedResourceResponse>, StatusCode> {
    let existing = state
        .repo
        .get_resource(id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    if existing.creator_id != user_id {
        return Err(StatusCode::FORBIDDEN);
    }
    if !payload.is_valid() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let curation = state
        .curator
        .curate_content(
            &payload.title,
            &payload.content,
            &payload.language,
            &payload.format,
        )
        .await;

    // None here means the row vanished between the check and the update.
    let resource = state
        .repo
        .update_resource(id, user_id, payload, curation.status)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(CuratedResourceResponse { resource, curation }))
}

/// delete_resource
///
/// [Authenticated Route] Deletes one of the caller's own resources.
#[utoipa::path(
    delete,
    path = "/resources/{id}",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_resource(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    let Some(existing) = state.repo.get_resource(id).await else {
        return StatusCode::NOT_FOUND;
    };
    if existing.creator_id != user_id {
        return StatusCode::FORBIDDEN;
    }
    if state.repo.delete_resource(id, user_id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_me
///
/// [Authenticated Route] The caller's profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, StatusCode> {
    state
        .repo
        .get_user(id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// get_my_resources
///
/// [Authenticated Route] Lists every resource the caller owns, whatever its status.
#[utoipa::path(
    get,
    path = "/me/resources",
    responses((status = 200, description = "My Resources", body = [Resource]))
)]
pub async fn get_my_resources(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<Resource>> {
    Json(state.repo.get_my_resources(id).await)
}

// --- Admin Handlers ---

/// get_review_queue
///
/// [Admin Route] Lists resources of any status, typically `?status=Pending` to work through
/// items curation could not decide.
#[utoipa::path(
    get,
    path = "/admin/resources",
    params(ReviewQueueFilter),
    responses(
        (status = 200, description = "Resources", body = ResourcePage),
        (status = 403, description = "Not Admin")
    )
)]
pub async fn get_review_queue(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ReviewQueueFilter>,
) -> Result<Json<ResourcePage>, StatusCode> {
    if !user.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    let query = filter.into_query()?;
    Ok(Json(state.repo.list_resources(query).await))
}

/// update_resource_status
///
/// [Admin Route] Manual moderation override of a resource's curation status.
#[utoipa::path(
    put,
    path = "/admin/resources/{id}/status",
    params(("id" = Uuid, Path, description = "Resource ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated", body = Resource),
        (status = 403, description = "Not Admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_resource_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Resource>, StatusCode> {
    if !user.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    let resource = state
        .repo
        .set_resource_status(id, payload.status)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(resource_id = %id, status = %payload.status, admin_id = %user.id, "status overridden");
    Ok(Json(resource))
}
