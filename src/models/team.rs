//! Team model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team and its members. Team names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Storage id; `0` for a team that has not been persisted yet.
    pub id: i64,
    pub name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    /// A team that does not exist in storage yet.
    pub fn new(name: impl Into<String>, members: Vec<TeamMember>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            members,
        }
    }
}

/// Membership entry of a team; creating a team upserts the matching user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub user_id: i64,
    pub username: String,
    pub is_active: bool,
}
