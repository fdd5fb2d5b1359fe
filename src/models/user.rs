//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user together with the name of the team they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

/// Input for toggling a user's active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetUserActive {
    pub user_id: i64,
    pub is_active: bool,
}
