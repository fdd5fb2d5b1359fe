//! Application error types.
//!
//! Every use case returns `AppError`. The HTTP layer maps each variant to a
//! status code and error code; nothing below it knows about transport.

use serde::Serialize;
use thiserror::Error;

/// Application-level errors returned by the team, user and pull request use cases.
///
/// All variants serialize to a structured JSON object for logging and diagnostics.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Referenced user does not exist.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    /// Referenced pull request does not exist.
    #[error("Pull request not found: {pull_request_id}")]
    PullRequestNotFound { pull_request_id: i64 },

    /// A pull request with this id is already stored.
    #[error("Pull request already exists: {pull_request_id}")]
    PullRequestExists { pull_request_id: i64 },

    /// Reviewers cannot be changed once a pull request is merged.
    #[error("Pull request is merged: {pull_request_id}")]
    PullRequestIsMerged { pull_request_id: i64 },

    /// The user is not one of the pull request's reviewers.
    #[error("User {user_id} is not assigned to pull request {pull_request_id}")]
    NotAssigned { pull_request_id: i64, user_id: i64 },

    /// No active teammate is left to take over the review.
    #[error("No active replacement candidate for pull request {pull_request_id}")]
    NoAvailableCandidates { pull_request_id: i64 },

    /// A team with this name is already stored.
    #[error("Team already exists: {team_name}")]
    TeamExists { team_name: String },

    /// Referenced team does not exist.
    #[error("Team not found: {team_name}")]
    TeamNotFound { team_name: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Storage operation failed.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        operation: String,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn user_not_found(user_id: i64) -> Self {
        Self::UserNotFound { user_id }
    }

    pub fn pull_request_not_found(pull_request_id: i64) -> Self {
        Self::PullRequestNotFound { pull_request_id }
    }

    pub fn pull_request_exists(pull_request_id: i64) -> Self {
        Self::PullRequestExists { pull_request_id }
    }

    pub fn pull_request_is_merged(pull_request_id: i64) -> Self {
        Self::PullRequestIsMerged { pull_request_id }
    }

    pub fn not_assigned(pull_request_id: i64, user_id: i64) -> Self {
        Self::NotAssigned {
            pull_request_id,
            user_id,
        }
    }

    pub fn no_available_candidates(pull_request_id: i64) -> Self {
        Self::NoAvailableCandidates { pull_request_id }
    }

    pub fn team_exists(team_name: impl Into<String>) -> Self {
        Self::TeamExists {
            team_name: team_name.into(),
        }
    }

    pub fn team_not_found(team_name: impl Into<String>) -> Self {
        Self::TeamNotFound {
            team_name: team_name.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a storage error with operation context, e.g. `"get_pull_request(42)"`.
    pub fn storage(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            operation: operation.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is one of the "not found" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. } | Self::PullRequestNotFound { .. } | Self::TeamNotFound { .. }
        )
    }

    /// Whether this error hides an unexpected failure rather than a rejected request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }
}
