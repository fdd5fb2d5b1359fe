//! Database queries for pull requests and their reviewer links.
//!
//! Reviewer links carry a `position` so a swapped-in reviewer takes the
//! slot of the one it replaces.

use crate::db::pool::DbPool;
use crate::db::DbError;
use crate::models::{PullRequest, PullRequestStatus, PullRequestSummary, User};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct PullRequestRow {
    id: i64,
    title: String,
    author_id: i64,
    status: String,
    created_at: i64,
    merged_at: Option<i64>,
}

impl PullRequestRow {
    fn into_pull_request(self, reviewers: Vec<i64>) -> Result<PullRequest, DbError> {
        Ok(PullRequest {
            id: self.id,
            name: self.title,
            author_id: self.author_id,
            status: parse_status(&self.status)?,
            assigned_reviewers: reviewers,
            created_at: from_millis(self.created_at)?,
            merged_at: self.merged_at.map(from_millis).transpose()?,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    id: i64,
    title: String,
    author_id: i64,
    status: String,
}

fn parse_status(raw: &str) -> Result<PullRequestStatus, DbError> {
    raw.parse().map_err(DbError::InvalidData)
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DbError::InvalidData(format!("timestamp out of range: {}", ms)))
}

/// Check whether a pull request with this id is stored.
pub async fn pull_request_exists(pool: &DbPool, id: i64) -> Result<bool, DbError> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pull_requests WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists != 0)
}

/// Active members of the author's team, not including the author.
pub async fn active_teammates_excluding_author(
    pool: &DbPool,
    author_id: i64,
) -> Result<Vec<User>, DbError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name AS username, t.name AS team_name, u.is_active
        FROM users u
        JOIN teams t ON t.id = u.team_id
        WHERE u.team_id = (SELECT team_id FROM users WHERE id = ?)
          AND u.id <> ?
          AND u.is_active = 1
        ORDER BY u.id
        "#,
    )
    .bind(author_id)
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Insert a pull request and its reviewer links in one transaction.
///
/// Either the row and every link are stored, or nothing is.
pub async fn insert_with_reviewers(pool: &DbPool, pr: &PullRequest) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pull_requests (id, title, author_id, status, created_at, merged_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(pr.id)
    .bind(&pr.name)
    .bind(pr.author_id)
    .bind(pr.status.as_str())
    .bind(pr.created_at.timestamp_millis())
    .bind(pr.merged_at.map(|t| t.timestamp_millis()))
    .execute(&mut *tx)
    .await?;

    for (position, reviewer_id) in pr.assigned_reviewers.iter().enumerate() {
        sqlx::query(
            "INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id, position) VALUES (?, ?, ?)",
        )
        .bind(pr.id)
        .bind(reviewer_id)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Load a pull request with its reviewers in assignment order.
pub async fn get_pull_request(pool: &DbPool, id: i64) -> Result<PullRequest, DbError> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT id, title, author_id, status, created_at, merged_at
        FROM pull_requests
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::NotFound(format!("pull request {}", id)))?;

    let reviewers: Vec<i64> = sqlx::query_scalar(
        "SELECT reviewer_id FROM pull_request_reviewers WHERE pull_request_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    row.into_pull_request(reviewers)
}

/// Persist the status and merge timestamp of a pull request.
pub async fn update_status(pool: &DbPool, pr: &PullRequest) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE pull_requests SET status = ?, merged_at = ? WHERE id = ?")
        .bind(pr.status.as_str())
        .bind(pr.merged_at.map(|t| t.timestamp_millis()))
        .bind(pr.id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("pull request {}", pr.id)));
    }

    Ok(())
}

/// Replace one reviewer link with another, keeping its position.
///
/// Runs in one transaction; fails without changes if `old_reviewer_id`
/// is no longer linked to the pull request.
pub async fn swap_reviewer(
    pool: &DbPool,
    pull_request_id: i64,
    old_reviewer_id: i64,
    new_reviewer_id: i64,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let position: Option<i64> = sqlx::query_scalar(
        r#"
        DELETE FROM pull_request_reviewers
        WHERE pull_request_id = ? AND reviewer_id = ?
        RETURNING position
        "#,
    )
    .bind(pull_request_id)
    .bind(old_reviewer_id)
    .fetch_optional(&mut *tx)
    .await?;

    let position = position.ok_or_else(|| {
        DbError::NotFound(format!(
            "reviewer {} on pull request {}",
            old_reviewer_id, pull_request_id
        ))
    })?;

    sqlx::query(
        "INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id, position) VALUES (?, ?, ?)",
    )
    .bind(pull_request_id)
    .bind(new_reviewer_id)
    .bind(position)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}

/// Pull requests the user is assigned to review, newest first.
pub async fn list_reviewed_by(
    pool: &DbPool,
    reviewer_id: i64,
) -> Result<Vec<PullRequestSummary>, DbError> {
    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT pr.id, pr.title, pr.author_id, pr.status
        FROM pull_requests pr
        JOIN pull_request_reviewers r ON r.pull_request_id = pr.id
        WHERE r.reviewer_id = ?
        ORDER BY pr.created_at DESC, pr.id DESC
        "#,
    )
    .bind(reviewer_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(PullRequestSummary {
                id: row.id,
                name: row.title,
                author_id: row.author_id,
                status: parse_status(&row.status)?,
            })
        })
        .collect()
}
