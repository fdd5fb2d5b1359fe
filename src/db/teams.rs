//! Database queries for teams.

use crate::db::pool::DbPool;
use crate::db::DbError;
use crate::models::{Team, TeamMember};

/// Check whether a team with this name is stored.
pub async fn team_exists(pool: &DbPool, name: &str) -> Result<bool, DbError> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE name = ?)")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(exists != 0)
}

/// Insert a team and upsert its members in one transaction.
///
/// Members that already exist are renamed, re-flagged and moved into the
/// new team. Returns the team with its assigned id.
pub async fn insert_with_members(pool: &DbPool, team: &Team) -> Result<Team, DbError> {
    let mut tx = pool.begin().await?;

    let team_id: i64 = sqlx::query_scalar("INSERT INTO teams (name) VALUES (?) RETURNING id")
        .bind(&team.name)
        .fetch_one(&mut *tx)
        .await?;

    for member in &team.members {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, is_active, team_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                is_active = excluded.is_active,
                team_id = excluded.team_id
            "#,
        )
        .bind(member.user_id)
        .bind(&member.username)
        .bind(member.is_active)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Team {
        id: team_id,
        name: team.name.clone(),
        members: team.members.clone(),
    })
}

/// Load a team and its members, ordered by user id.
pub async fn get_team(pool: &DbPool, name: &str) -> Result<Team, DbError> {
    let (id, name): (i64, String) = sqlx::query_as("SELECT id, name FROM teams WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("team {}", name)))?;

    let members = sqlx::query_as::<_, TeamMember>(
        "SELECT id AS user_id, name AS username, is_active FROM users WHERE team_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Team { id, name, members })
}
