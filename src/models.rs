use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::curation::{CurationResult, CurationStatus};

/// Role granted access to the review queue and manual status overrides.
pub const ADMIN_ROLE: &str = "admin";

/// Roles a profile may carry.
pub const VALID_ROLES: [&str; 4] = ["Educator", "Student", "Designer", ADMIN_ROLE];

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `profiles` table. Credentials live with the
/// external identity provider; this table only mirrors id, name, email and role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    // RBAC field: Educator, Student, Designer or admin.
    pub role: String,
}

/// Resource
///
/// An educational resource from the `resources` table. Visibility is gated by `status`,
/// which is always the verdict of the most recent curation (or an admin override).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Resource {
    pub id: Uuid,
    // FK to profiles.id (Owner).
    pub creator_id: Uuid,
    pub title: String,
    pub content: String,
    pub language: String,
    // pdf, video, audio, text, ...
    pub format: String,
    pub theme: String,
    pub level: String,

    // Stored as TEXT, constrained by a CHECK to the three curation values.
    #[sqlx(try_from = "String")]
    pub status: CurationStatus,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// ResourceRequest
///
/// Input payload for POST /resources and PUT /resources/{id}. Title and content are
/// required; the descriptive fields default to empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ResourceRequest {
    #[schema(example = "Intro to Fractions")]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    #[schema(example = "en")]
    pub language: String,
    #[serde(default)]
    #[schema(example = "text")]
    pub format: String,
}

impl ResourceRequest {
    /// is_valid
    ///
    /// Title and content must carry something other than whitespace, and every field must
    /// fit its column width in the `resources` table.
    pub fn is_valid(&self) -> bool {
        let fits = |value: &str, max: usize| value.chars().count() <= max;
        !self.title.trim().is_empty()
            && !self.content.trim().is_empty()
            && fits(&self.title, 200)
            && fits(&self.language, 10)
            && fits(&self.format, 50)
            && fits(&self.theme, 100)
            && fits(&self.level, 50)
    }
}

/// StatusUpdateRequest
///
/// Admin override payload for PUT /admin/resources/{id}/status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StatusUpdateRequest {
    pub status: CurationStatus,
}

// --- Output Schemas ---

/// CuratedResourceResponse
///
/// Returned by create and update: the stored resource plus the full curation verdict,
/// so the author can see why it landed in its status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CuratedResourceResponse {
    pub resource: Resource,
    pub curation: CurationResult,
}

/// ResourcePage
///
/// One page of a resource listing with the total match count.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ResourcePage {
    pub data: Vec<Resource>,
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
}

// --- Repository Inputs ---

/// ResourceQuery
///
/// Validated listing filter handed to the repository. `status: None` means any status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceQuery {
    pub status: Option<CurationStatus>,
    pub theme: Option<String>,
    pub level: Option<String>,
    pub language: Option<String>,
    pub format: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
