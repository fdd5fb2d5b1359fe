//! REST API routes.
//!
//! Decodes wire payloads, turns wire ids into domain ids, calls the use
//! cases and maps `AppError` onto status codes and error codes.

use crate::error::AppError;
use crate::models::{
    CreatePullRequest, PullRequest, PullRequestStatus, PullRequestSummary, ReassignReviewer,
    SetUserActive, Team, TeamMember, User,
};
use crate::services::ids::{
    format_pull_request_id, format_user_id, parse_pull_request_id, parse_user_id, require_text,
};
use crate::services::server::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    code: &'static str,
    message: String,
}

/// Error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Serialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(AppError);

impl ApiErr {
    /// Status code and wire error code for a domain error.
    pub fn status_and_code(err: &AppError) -> (StatusCode, &'static str) {
        match err {
            e if e.is_not_found() => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::PullRequestExists { .. } => (StatusCode::CONFLICT, "PR_EXISTS"),
            AppError::PullRequestIsMerged { .. } => (StatusCode::CONFLICT, "PR_MERGED"),
            AppError::NotAssigned { .. } => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
            AppError::NoAvailableCandidates { .. } => (StatusCode::CONFLICT, "NO_CANDIDATE"),
            AppError::TeamExists { .. } => (StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
            AppError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

/// Fixed client-facing message for each wire error code.
fn message_for(code: &str) -> &'static str {
    match code {
        "NOT_FOUND" => "resource not found",
        "PR_EXISTS" => "PR id already exists",
        "PR_MERGED" => "cannot reassign on merged PR",
        "NOT_ASSIGNED" => "reviewer is not assigned to this PR",
        "NO_CANDIDATE" => "no active replacement candidate in team",
        "TEAM_EXISTS" => "team_name already exists",
        "BAD_REQUEST" => "invalid body request",
        _ => "internal server error",
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = Self::status_and_code(&self.0);
        // Details stay in the logs; clients get the code's fixed message
        if !self.0.is_internal() {
            log::debug!("[http] {} rejected: {}", code, self.0);
        }
        (
            status,
            Json(ApiErrorResponse {
                error: ApiErrorBody {
                    code,
                    message: message_for(code).to_string(),
                },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

/// Response for requests that panicked inside a handler.
pub fn internal_error_response() -> Response {
    ApiErr(AppError::internal("handler panicked")).into_response()
}

// ── Request bodies ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TeamMemberBody {
    user_id: String,
    username: String,
    is_active: bool,
}

#[derive(Deserialize)]
struct TeamBody {
    team_name: String,
    members: Vec<TeamMemberBody>,
}

impl TeamBody {
    fn into_team(self) -> Result<Team, AppError> {
        require_text(&self.team_name, "team_name")?;
        if self.members.is_empty() {
            return Err(AppError::invalid_input_field(
                "team members cannot be empty",
                "members",
            ));
        }

        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(self.members.len());
        for m in self.members {
            let user_id = parse_user_id(&m.user_id, "members.user_id")?;
            require_text(&m.username, "members.username")?;
            if !seen.insert(user_id) {
                return Err(AppError::invalid_input_field(
                    format!("duplicate member '{}'", m.user_id),
                    "members.user_id",
                ));
            }
            members.push(TeamMember {
                user_id,
                username: m.username,
                is_active: m.is_active,
            });
        }

        Ok(Team::new(self.team_name, members))
    }
}

#[derive(Deserialize)]
struct TeamQuery {
    team_name: String,
}

#[derive(Deserialize)]
struct SetIsActiveBody {
    user_id: String,
    is_active: bool,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: String,
}

#[derive(Deserialize)]
struct CreatePullRequestBody {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
}

#[derive(Deserialize)]
struct MergePullRequestBody {
    pull_request_id: String,
}

#[derive(Deserialize)]
struct ReassignBody {
    pull_request_id: String,
    old_user_id: String,
}

// ── Response bodies ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TeamMemberView {
    user_id: String,
    username: String,
    is_active: bool,
}

#[derive(Serialize)]
struct TeamView {
    team_name: String,
    members: Vec<TeamMemberView>,
}

impl From<Team> for TeamView {
    fn from(team: Team) -> Self {
        Self {
            team_name: team.name,
            members: team
                .members
                .into_iter()
                .map(|m| TeamMemberView {
                    user_id: format_user_id(m.user_id),
                    username: m.username,
                    is_active: m.is_active,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct TeamEnvelope {
    team: TeamView,
}

#[derive(Serialize)]
struct UserView {
    user_id: String,
    username: String,
    team_name: String,
    is_active: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            user_id: format_user_id(user.id),
            username: user.username,
            team_name: user.team_name,
            is_active: user.is_active,
        }
    }
}

#[derive(Serialize)]
struct UserEnvelope {
    user: UserView,
}

#[derive(Serialize)]
struct PullRequestView {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: PullRequestStatus,
    assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none")]
    merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestView {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: format_pull_request_id(pr.id),
            pull_request_name: pr.name,
            author_id: format_user_id(pr.author_id),
            status: pr.status,
            assigned_reviewers: pr.assigned_reviewers.into_iter().map(format_user_id).collect(),
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Serialize)]
struct PullRequestEnvelope {
    pr: PullRequestView,
}

#[derive(Serialize)]
struct ReassignEnvelope {
    pr: PullRequestView,
    replaced_by: String,
}

#[derive(Serialize)]
struct PullRequestShortView {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: PullRequestStatus,
}

impl From<PullRequestSummary> for PullRequestShortView {
    fn from(pr: PullRequestSummary) -> Self {
        Self {
            pull_request_id: format_pull_request_id(pr.id),
            pull_request_name: pr.name,
            author_id: format_user_id(pr.author_id),
            status: pr.status,
        }
    }
}

#[derive(Serialize)]
struct UserReviewsView {
    user_id: String,
    pull_requests: Vec<PullRequestShortView>,
}

// ── Route builders ───────────────────────────────────────────────────────────

pub fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
}

pub fn pull_request_routes() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /team/add: create a team and upsert its members.
async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<TeamBody>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamEnvelope>), ApiErr> {
    let Json(body) = payload?;
    let team = state.teams.create_team(body.into_team()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(TeamEnvelope { team: team.into() }),
    ))
}

/// GET /team/get?team_name=X: a team with its members.
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<TeamView>, ApiErr> {
    let Query(params) = query?;
    require_text(&params.team_name, "team_name")?;

    let team = state.teams.get_team(&params.team_name).await?;
    Ok(Json(team.into()))
}

/// POST /users/setIsActive: toggle a user's active flag.
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveBody>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiErr> {
    let Json(body) = payload?;
    let input = SetUserActive {
        user_id: parse_user_id(&body.user_id, "user_id")?,
        is_active: body.is_active,
    };

    let user = state.users.set_user_active(input).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

/// GET /users/getReview?user_id=uX: pull requests the user reviews.
async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviewsView>, ApiErr> {
    let Query(params) = query?;
    let user_id = parse_user_id(&params.user_id, "user_id")?;

    let pull_requests = state.users.review_assignments(user_id).await?;
    Ok(Json(UserReviewsView {
        user_id: params.user_id,
        pull_requests: pull_requests.into_iter().map(Into::into).collect(),
    }))
}

/// POST /pullRequest/create: open a pull request and assign reviewers.
async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestEnvelope>), ApiErr> {
    let Json(body) = payload?;
    let author_id = parse_user_id(&body.author_id, "author_id")?;
    let pull_request_id = parse_pull_request_id(&body.pull_request_id, "pull_request_id")?;
    require_text(&body.pull_request_name, "pull_request_name")?;

    let pr = state
        .pull_requests
        .create_pull_request(CreatePullRequest {
            pull_request_id,
            name: body.pull_request_name,
            author_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PullRequestEnvelope { pr: pr.into() }),
    ))
}

/// POST /pullRequest/merge: mark a pull request as merged (idempotent).
async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestBody>, JsonRejection>,
) -> Result<Json<PullRequestEnvelope>, ApiErr> {
    let Json(body) = payload?;
    let pull_request_id = parse_pull_request_id(&body.pull_request_id, "pull_request_id")?;

    let pr = state.pull_requests.merge_pull_request(pull_request_id).await?;
    Ok(Json(PullRequestEnvelope { pr: pr.into() }))
}

/// POST /pullRequest/reassign: swap one reviewer for another teammate.
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignBody>, JsonRejection>,
) -> Result<Json<ReassignEnvelope>, ApiErr> {
    let Json(body) = payload?;
    let input = ReassignReviewer {
        pull_request_id: parse_pull_request_id(&body.pull_request_id, "pull_request_id")?,
        old_reviewer_id: parse_user_id(&body.old_user_id, "old_user_id")?,
    };

    let outcome = state.pull_requests.reassign_reviewer(input).await?;
    Ok(Json(ReassignEnvelope {
        pr: outcome.pull_request.into(),
        replaced_by: format_user_id(outcome.replaced_by),
    }))
}
