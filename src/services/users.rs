//! User use cases.

use crate::error::AppError;
use crate::models::{PullRequestSummary, SetUserActive, User};
use crate::services::storage_failure;
use crate::services::store::UserStore;
use std::sync::Arc;

const COMPONENT: &str = "users";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Toggle the active flag. Inactive users are never picked as reviewers
    /// but keep the reviews they already have.
    pub async fn set_user_active(&self, input: SetUserActive) -> Result<User, AppError> {
        self.ensure_user_exists(input.user_id).await?;

        let user = self
            .users
            .set_user_active(input.user_id, input.is_active)
            .await
            .map_err(|e| {
                storage_failure(COMPONENT, e, format!("set_user_active({})", input.user_id))
            })?;

        log::info!("[users] User {} is_active={}", user.id, user.is_active);

        Ok(user)
    }

    /// Pull requests the user currently reviews, newest first.
    pub async fn review_assignments(&self, user_id: i64) -> Result<Vec<PullRequestSummary>, AppError> {
        self.ensure_user_exists(user_id).await?;

        self.users
            .review_assignments(user_id)
            .await
            .map_err(|e| storage_failure(COMPONENT, e, format!("review_assignments({})", user_id)))
    }

    async fn ensure_user_exists(&self, user_id: i64) -> Result<(), AppError> {
        let exists = self
            .users
            .user_exists(user_id)
            .await
            .map_err(|e| storage_failure(COMPONENT, e, format!("user_exists({})", user_id)))?;

        if exists {
            Ok(())
        } else {
            Err(AppError::user_not_found(user_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::PullRequestStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubUsers {
        user: User,
        writes: AtomicUsize,
    }

    impl StubUsers {
        fn new() -> Self {
            Self {
                user: User {
                    id: 2,
                    username: "Bob".into(),
                    team_name: "backend".into(),
                    is_active: true,
                },
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl UserStore for StubUsers {
        async fn user_exists(&self, id: i64) -> Result<bool, DbError> {
            Ok(id == self.user.id)
        }

        async fn set_user_active(&self, _id: i64, is_active: bool) -> Result<User, DbError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(User {
                is_active,
                ..self.user.clone()
            })
        }

        async fn review_assignments(&self, _user_id: i64) -> Result<Vec<PullRequestSummary>, DbError> {
            Ok(vec![PullRequestSummary {
                id: 1,
                name: "Add search".into(),
                author_id: 1,
                status: PullRequestStatus::Open,
            }])
        }
    }

    #[tokio::test]
    async fn test_set_user_active() {
        let service = UserService::new(Arc::new(StubUsers::new()));
        let user = service
            .set_user_active(SetUserActive {
                user_id: 2,
                is_active: false,
            })
            .await
            .unwrap();
        assert!(!user.is_active);
        assert_eq!(user.team_name, "backend");
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_written() {
        let store = Arc::new(StubUsers::new());
        let service = UserService::new(store.clone());

        let err = service
            .set_user_active(SetUserActive {
                user_id: 99,
                is_active: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound { user_id: 99 }));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_review_assignments() {
        let service = UserService::new(Arc::new(StubUsers::new()));

        let reviews = service.review_assignments(2).await.unwrap();
        assert_eq!(reviews.len(), 1);

        let err = service.review_assignments(3).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
