//! Storage collaborators used by the use cases.
//!
//! The traits describe exactly what each use case needs from storage, so the
//! assignment engine can be driven by an in-memory stub in tests. `SqliteStore`
//! implements all of them on top of the `db` query modules.

use crate::db::pool::DbPool;
use crate::db::{self, DbError};
use crate::models::{PullRequest, PullRequestSummary, Team, User};
use async_trait::async_trait;

/// Pull request storage as seen by the reviewer assignment engine.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    async fn pull_request_exists(&self, id: i64) -> Result<bool, DbError>;

    /// Active users sharing the author's team, the author excluded.
    async fn active_teammates_excluding_author(&self, author_id: i64)
        -> Result<Vec<User>, DbError>;

    /// Persist the pull request row and its reviewer links as one unit.
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<PullRequest, DbError>;

    async fn get_pull_request(&self, id: i64) -> Result<PullRequest, DbError>;

    async fn update_status(&self, pr: &PullRequest) -> Result<PullRequest, DbError>;

    /// Replace one reviewer link by another as one unit.
    async fn swap_reviewer(
        &self,
        pull_request_id: i64,
        old_reviewer_id: i64,
        new_reviewer_id: i64,
    ) -> Result<(), DbError>;
}

/// User storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_exists(&self, id: i64) -> Result<bool, DbError>;

    async fn set_user_active(&self, id: i64, is_active: bool) -> Result<User, DbError>;

    /// Pull requests the user is assigned to review, newest first.
    async fn review_assignments(&self, user_id: i64) -> Result<Vec<PullRequestSummary>, DbError>;
}

/// Team storage.
#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn team_exists(&self, name: &str) -> Result<bool, DbError>;

    /// Insert the team and upsert its members as one unit.
    async fn create_team(&self, team: &Team) -> Result<Team, DbError>;

    async fn get_team(&self, name: &str) -> Result<Team, DbError>;
}

/// SQLite-backed implementation of every store trait.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PullRequestStore for SqliteStore {
    async fn pull_request_exists(&self, id: i64) -> Result<bool, DbError> {
        db::pull_requests::pull_request_exists(&self.pool, id).await
    }

    async fn active_teammates_excluding_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<User>, DbError> {
        db::pull_requests::active_teammates_excluding_author(&self.pool, author_id).await
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<PullRequest, DbError> {
        db::pull_requests::insert_with_reviewers(&self.pool, pr).await?;
        Ok(pr.clone())
    }

    async fn get_pull_request(&self, id: i64) -> Result<PullRequest, DbError> {
        db::pull_requests::get_pull_request(&self.pool, id).await
    }

    async fn update_status(&self, pr: &PullRequest) -> Result<PullRequest, DbError> {
        db::pull_requests::update_status(&self.pool, pr).await?;
        Ok(pr.clone())
    }

    async fn swap_reviewer(
        &self,
        pull_request_id: i64,
        old_reviewer_id: i64,
        new_reviewer_id: i64,
    ) -> Result<(), DbError> {
        db::pull_requests::swap_reviewer(&self.pool, pull_request_id, old_reviewer_id, new_reviewer_id)
            .await
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn user_exists(&self, id: i64) -> Result<bool, DbError> {
        db::users::user_exists(&self.pool, id).await
    }

    async fn set_user_active(&self, id: i64, is_active: bool) -> Result<User, DbError> {
        db::users::set_active(&self.pool, id, is_active).await
    }

    async fn review_assignments(&self, user_id: i64) -> Result<Vec<PullRequestSummary>, DbError> {
        db::pull_requests::list_reviewed_by(&self.pool, user_id).await
    }
}

#[async_trait]
impl TeamStore for SqliteStore {
    async fn team_exists(&self, name: &str) -> Result<bool, DbError> {
        db::teams::team_exists(&self.pool, name).await
    }

    async fn create_team(&self, team: &Team) -> Result<Team, DbError> {
        db::teams::insert_with_members(&self.pool, team).await
    }

    async fn get_team(&self, name: &str) -> Result<Team, DbError> {
        db::teams::get_team(&self.pool, name).await
    }
}
