use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// CurationStatus
///
/// The moderation outcome attached to every resource. Serialized (JSON and the
/// `resources.status` column) as the exact strings `Approved`, `Pending`, `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub enum CurationStatus {
    Approved,
    // New and unreviewed resources start here.
    #[default]
    Pending,
    Rejected,
}

impl CurationStatus {
    pub const ALL: [CurationStatus; 3] = [
        CurationStatus::Approved,
        CurationStatus::Pending,
        CurationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurationStatus::Approved => "Approved",
            CurationStatus::Pending => "Pending",
            CurationStatus::Rejected => "Rejected",
        }
    }

    /// Case-insensitive lookup used for provider output and query parameters.
    pub fn parse_loose(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for CurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted status string is not one of the three known values.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown curation status: {0:?}")]
pub struct UnknownStatus(pub String);

impl TryFrom<String> for CurationStatus {
    type Error = UnknownStatus;

    // Column values are written by this crate, so the match is exact.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Approved" => Ok(CurationStatus::Approved),
            "Pending" => Ok(CurationStatus::Pending),
            "Rejected" => Ok(CurationStatus::Rejected),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// CurationResult
///
/// The verdict of a single curation call. Only `status` is persisted on the resource;
/// `reason` travels back to the caller and into the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CurationResult {
    pub status: CurationStatus,
    pub reason: String,
}

impl CurationResult {
    pub fn new(status: CurationStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    pub fn approved(reason: impl Into<String>) -> Self {
        Self::new(CurationStatus::Approved, reason)
    }

    pub fn pending(reason: impl Into<String>) -> Self {
        Self::new(CurationStatus::Pending, reason)
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(CurationStatus::Rejected, reason)
    }
}

/// The four text fields a resource submits for moderation.
#[derive(Debug, Clone, Copy)]
pub struct ModerationInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub language: &'a str,
    pub format: &'a str,
}
