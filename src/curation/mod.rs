//! Content Curation
//!
//! Decides whether a submitted resource is Approved, Pending or Rejected before it becomes
//! visible. Two stages: a local heuristic filter, then an external classification provider.
//! Provider failures never surface to the caller; they degrade to Pending.
pub mod gateway;
pub mod heuristic;
pub mod orchestrator;
pub mod types;

pub use gateway::{ClassificationGateway, GatewayError, MockGateway, XaiGateway};
pub use orchestrator::{CurationProvider, CurationService};
pub use types::{CurationResult, CurationStatus, ModerationInput, UnknownStatus};
