//! Team use cases.

use crate::error::AppError;
use crate::models::Team;
use crate::services::storage_failure;
use crate::services::store::TeamStore;
use std::sync::Arc;

const COMPONENT: &str = "teams";

#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }

    /// Create a team, creating or moving its members into it.
    pub async fn create_team(&self, team: Team) -> Result<Team, AppError> {
        if self.team_exists(&team.name).await? {
            return Err(AppError::team_exists(team.name));
        }

        match self.teams.create_team(&team).await {
            Ok(created) => {
                log::info!(
                    "[teams] Created team '{}' with {} members",
                    created.name,
                    created.members.len()
                );
                Ok(created)
            }
            Err(e) if e.is_unique_violation() => Err(AppError::team_exists(team.name)),
            Err(e) => Err(storage_failure(COMPONENT, e, format!("create_team({})", team.name))),
        }
    }

    pub async fn get_team(&self, name: &str) -> Result<Team, AppError> {
        if !self.team_exists(name).await? {
            return Err(AppError::team_not_found(name));
        }

        self.teams
            .get_team(name)
            .await
            .map_err(|e| storage_failure(COMPONENT, e, format!("get_team({})", name)))
    }

    async fn team_exists(&self, name: &str) -> Result<bool, AppError> {
        self.teams
            .team_exists(name)
            .await
            .map_err(|e| storage_failure(COMPONENT, e, format!("team_exists({})", name)))
    }
}
