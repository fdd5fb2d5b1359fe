//! Domain models.
//!
//! Entities hold plain values; no entity refers to another except by id.
//! Cross-entity lookups go through the storage traits in `services::store`.

pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{
    CreatePullRequest, PullRequest, PullRequestStatus, PullRequestSummary, ReassignOutcome,
    ReassignReviewer, MAX_REVIEWERS,
};
pub use team::{Team, TeamMember};
pub use user::{SetUserActive, User};
