//! Pull request model.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of reviewers assigned to a single pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Status of a pull request. `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl FromStr for PullRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(format!("unknown pull request status '{}'", other)),
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current time at the precision the database keeps (milliseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A pull request together with its assigned reviewers.
///
/// Invariants: `merged_at.is_some()` exactly when `status == Merged`, and
/// `author_id` never appears in `assigned_reviewers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub status: PullRequestStatus,
    /// Reviewer user ids in assignment order; at most [`MAX_REVIEWERS`].
    pub assigned_reviewers: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// A freshly opened pull request created now.
    pub fn open(id: i64, name: impl Into<String>, author_id: i64, reviewers: Vec<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers,
            created_at: now(),
            merged_at: None,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    /// Transition to `Merged` at `at`. Does nothing if already merged.
    pub fn mark_merged(&mut self, at: DateTime<Utc>) {
        if self.is_merged() {
            return;
        }
        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(at);
    }

    /// Position of `user_id` among the assigned reviewers.
    pub fn reviewer_position(&self, user_id: i64) -> Option<usize> {
        self.assigned_reviewers.iter().position(|&id| id == user_id)
    }

    pub fn is_reviewer(&self, user_id: i64) -> bool {
        self.assigned_reviewers.contains(&user_id)
    }
}

/// Row-level view of a pull request without its reviewers, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSummary {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub status: PullRequestStatus,
}

/// Input for opening a new pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequest {
    pub pull_request_id: i64,
    pub name: String,
    pub author_id: i64,
}

/// Input for replacing one reviewer of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReassignReviewer {
    pub pull_request_id: i64,
    pub old_reviewer_id: i64,
}

/// Result of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignOutcome {
    pub pull_request: PullRequest,
    pub replaced_by: i64,
}
