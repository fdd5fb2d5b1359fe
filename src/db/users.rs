//! Database queries for users.

use crate::db::pool::DbPool;
use crate::db::DbError;
use crate::models::User;

/// Check whether a user with this id is stored.
pub async fn user_exists(pool: &DbPool, id: i64) -> Result<bool, DbError> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists != 0)
}

/// Set the active flag and return the updated user with its team name.
pub async fn set_active(pool: &DbPool, id: i64, is_active: bool) -> Result<User, DbError> {
    let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("user {}", id)));
    }

    get_user(pool, id).await
}

/// Load a user with its team name.
pub async fn get_user(pool: &DbPool, id: i64) -> Result<User, DbError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name AS username, t.name AS team_name, u.is_active
        FROM users u
        JOIN teams t ON t.id = u.team_id
        WHERE u.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
}
