//! Storage layer tests.
//!
//! Verifies that multi-row writes are atomic and that reviewer links keep
//! their slot order:
//! 1. A pull request with a broken reviewer link leaves no rows behind
//! 2. Swapping a reviewer keeps its position
//! 3. Swapping a reviewer that is not linked changes nothing
//! 4. Team creation moves existing users

use pr_reviewer_lib::db::{self, pool::DbPool, DbError};
use pr_reviewer_lib::models::{PullRequest, PullRequestStatus, Team, TeamMember};
use tempfile::{tempdir, TempDir};

async fn setup_db() -> (TempDir, DbPool) {
    let dir = tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("test.db"), 1).await.unwrap();
    (dir, pool)
}

fn member(user_id: i64, username: &str, is_active: bool) -> TeamMember {
    TeamMember {
        user_id,
        username: username.to_string(),
        is_active,
    }
}

/// Team "core" with users 1..=4, user 4 inactive.
async fn setup_team(pool: &DbPool) {
    let team = Team::new(
        "core",
        vec![
            member(1, "Alice", true),
            member(2, "Bob", true),
            member(3, "Carol", true),
            member(4, "Dave", false),
        ],
    );
    db::teams::insert_with_members(pool, &team).await.unwrap();
}

async fn reviewer_link_count(pool: &DbPool, pull_request_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM pull_request_reviewers WHERE pull_request_id = ?")
        .bind(pull_request_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_insert_rolls_back_on_bad_reviewer() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let pr = PullRequest::open(1, "Add search", 1, vec![2, 999]);
    let result = db::pull_requests::insert_with_reviewers(&pool, &pr).await;
    assert!(result.is_err(), "Foreign key violation should fail the insert");

    assert!(!db::pull_requests::pull_request_exists(&pool, 1).await.unwrap());
    assert_eq!(reviewer_link_count(&pool, 1).await, 0);
}

#[tokio::test]
async fn test_duplicate_insert_is_unique_violation() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let pr = PullRequest::open(1, "Add search", 1, vec![2]);
    db::pull_requests::insert_with_reviewers(&pool, &pr).await.unwrap();

    let err = db::pull_requests::insert_with_reviewers(&pool, &pr)
        .await
        .unwrap_err();
    assert!(err.is_unique_violation(), "unexpected error: {:?}", err);
    assert_eq!(reviewer_link_count(&pool, 1).await, 1);
}

#[tokio::test]
async fn test_round_trip_preserves_fields() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let pr = PullRequest::open(7, "Refactor", 1, vec![3, 2]);
    db::pull_requests::insert_with_reviewers(&pool, &pr).await.unwrap();

    let loaded = db::pull_requests::get_pull_request(&pool, 7).await.unwrap();
    assert_eq!(loaded, pr);
    assert_eq!(loaded.assigned_reviewers, vec![3, 2]);
}

#[tokio::test]
async fn test_swap_keeps_position() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let pr = PullRequest::open(1, "Add search", 1, vec![2, 3]);
    db::pull_requests::insert_with_reviewers(&pool, &pr).await.unwrap();

    db::pull_requests::swap_reviewer(&pool, 1, 2, 4).await.unwrap();

    let loaded = db::pull_requests::get_pull_request(&pool, 1).await.unwrap();
    assert_eq!(loaded.assigned_reviewers, vec![4, 3]);
}

#[tokio::test]
async fn test_swap_missing_link_changes_nothing() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let pr = PullRequest::open(1, "Add search", 1, vec![2, 3]);
    db::pull_requests::insert_with_reviewers(&pool, &pr).await.unwrap();

    let err = db::pull_requests::swap_reviewer(&pool, 1, 4, 2).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));

    // Replacing with an already-linked reviewer fails and rolls back the delete
    let err = db::pull_requests::swap_reviewer(&pool, 1, 2, 3).await.unwrap_err();
    assert!(err.is_unique_violation(), "unexpected error: {:?}", err);

    let loaded = db::pull_requests::get_pull_request(&pool, 1).await.unwrap();
    assert_eq!(loaded.assigned_reviewers, vec![2, 3]);
}

#[tokio::test]
async fn test_merge_status_persisted() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let mut pr = PullRequest::open(1, "Add search", 1, vec![2]);
    db::pull_requests::insert_with_reviewers(&pool, &pr).await.unwrap();

    pr.mark_merged(pr_reviewer_lib::models::pull_request::now());
    db::pull_requests::update_status(&pool, &pr).await.unwrap();

    let loaded = db::pull_requests::get_pull_request(&pool, 1).await.unwrap();
    assert_eq!(loaded.status, PullRequestStatus::Merged);
    assert_eq!(loaded.merged_at, pr.merged_at);

    let missing = PullRequest::open(2, "Ghost", 1, vec![]);
    let err = db::pull_requests::update_status(&pool, &missing).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

#[tokio::test]
async fn test_active_teammates_excludes_author_and_inactive() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let mut ids: Vec<i64> = db::pull_requests::active_teammates_excluding_author(&pool, 1)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_reviewed_by_lists_newest_first() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    for id in [1, 2, 3] {
        let pr = PullRequest::open(id, format!("Change {}", id), 1, vec![2]);
        db::pull_requests::insert_with_reviewers(&pool, &pr).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let listed: Vec<i64> = db::pull_requests::list_reviewed_by(&pool, 2)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![3, 2, 1]);

    assert!(db::pull_requests::list_reviewed_by(&pool, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_new_team_moves_user() {
    let (_dir, pool) = setup_db().await;
    setup_team(&pool).await;

    let platform = Team::new("platform", vec![member(2, "Robert", false)]);
    db::teams::insert_with_members(&pool, &platform).await.unwrap();

    let user = db::users::get_user(&pool, 2).await.unwrap();
    assert_eq!(user.team_name, "platform");
    assert_eq!(user.username, "Robert");
    assert!(!user.is_active);

    let core = db::teams::get_team(&pool, "core").await.unwrap();
    let ids: Vec<i64> = core.members.iter().map(|m| m.user_id).collect();
    assert_eq!(ids, vec![1, 3, 4]);

    let err = db::teams::insert_with_members(&pool, &platform).await.unwrap_err();
    assert!(err.is_unique_violation());
}
