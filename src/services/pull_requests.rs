//! Reviewer assignment engine.
//!
//! Opens pull requests with up to two random reviewers from the author's
//! team, merges them, and swaps a reviewer for another random teammate.
//! Every precondition is checked before the single write of an operation,
//! so a rejected request never leaves partial state behind.

use crate::error::AppError;
use crate::models::{
    pull_request, CreatePullRequest, PullRequest, ReassignOutcome, ReassignReviewer, User,
    MAX_REVIEWERS,
};
use crate::services::reviewer_picker::ReviewerPicker;
use crate::services::storage_failure;
use crate::services::store::{PullRequestStore, UserStore};
use std::sync::Arc;

const COMPONENT: &str = "pull_requests";

/// Pull request use cases. Holds no state besides its collaborators.
#[derive(Clone)]
pub struct PullRequestService {
    pull_requests: Arc<dyn PullRequestStore>,
    users: Arc<dyn UserStore>,
    picker: Arc<dyn ReviewerPicker>,
}

impl PullRequestService {
    pub fn new(
        pull_requests: Arc<dyn PullRequestStore>,
        users: Arc<dyn UserStore>,
        picker: Arc<dyn ReviewerPicker>,
    ) -> Self {
        Self {
            pull_requests,
            users,
            picker,
        }
    }

    /// Open a pull request and assign up to [`MAX_REVIEWERS`] random active teammates.
    ///
    /// Fails with `UserNotFound` for an unknown author, then with
    /// `PullRequestExists` for a taken id. Having no eligible teammate is not
    /// an error; the pull request is opened without reviewers.
    pub async fn create_pull_request(
        &self,
        input: CreatePullRequest,
    ) -> Result<PullRequest, AppError> {
        let CreatePullRequest {
            pull_request_id,
            name,
            author_id,
        } = input;

        self.ensure_user_exists(author_id).await?;
        if self.pull_request_exists(pull_request_id).await? {
            return Err(AppError::pull_request_exists(pull_request_id));
        }

        let candidates = self.eligible_reviewers(author_id, &[]).await?;
        let reviewers: Vec<i64> = self
            .picker
            .pick_reviewers(candidates, MAX_REVIEWERS)
            .into_iter()
            .map(|u| u.id)
            .collect();

        let pr = PullRequest::open(pull_request_id, name, author_id, reviewers);

        let created = match self.pull_requests.create_pull_request(&pr).await {
            Ok(created) => created,
            // Lost a race against a concurrent create with the same id
            Err(e) if e.is_unique_violation() => {
                return Err(AppError::pull_request_exists(pull_request_id))
            }
            Err(e) => {
                return Err(storage_failure(
                    COMPONENT,
                    e,
                    format!("create_pull_request({})", pull_request_id),
                ))
            }
        };

        log::info!(
            "[pull_requests] Opened {} by {} with reviewers {:?}",
            created.id,
            created.author_id,
            created.assigned_reviewers
        );

        Ok(created)
    }

    /// Mark a pull request as merged.
    ///
    /// Merging an already merged pull request returns it unchanged and
    /// performs no write.
    pub async fn merge_pull_request(&self, pull_request_id: i64) -> Result<PullRequest, AppError> {
        if !self.pull_request_exists(pull_request_id).await? {
            return Err(AppError::pull_request_not_found(pull_request_id));
        }

        let mut pr = self.load(pull_request_id).await?;
        if pr.is_merged() {
            return Ok(pr);
        }

        pr.mark_merged(pull_request::now());

        let merged = self
            .pull_requests
            .update_status(&pr)
            .await
            .map_err(|e| {
                storage_failure(COMPONENT, e, format!("update_status({})", pull_request_id))
            })?;

        log::info!("[pull_requests] Merged {}", merged.id);

        Ok(merged)
    }

    /// Replace `old_reviewer_id` with a random active teammate of the author.
    ///
    /// The replacement is never the author, the reviewer being replaced, or
    /// another current reviewer. The new reviewer takes the old one's slot.
    pub async fn reassign_reviewer(
        &self,
        input: ReassignReviewer,
    ) -> Result<ReassignOutcome, AppError> {
        let ReassignReviewer {
            pull_request_id,
            old_reviewer_id,
        } = input;

        self.ensure_user_exists(old_reviewer_id).await?;
        if !self.pull_request_exists(pull_request_id).await? {
            return Err(AppError::pull_request_not_found(pull_request_id));
        }

        let mut pr = self.load(pull_request_id).await?;
        if pr.is_merged() {
            return Err(AppError::pull_request_is_merged(pull_request_id));
        }

        let position = pr
            .reviewer_position(old_reviewer_id)
            .ok_or_else(|| AppError::not_assigned(pull_request_id, old_reviewer_id))?;

        // Current reviewers, the one being replaced included, are not eligible
        let candidates = self
            .eligible_reviewers(pr.author_id, &pr.assigned_reviewers)
            .await?;
        let replacement = self
            .picker
            .pick_replacement(&candidates)
            .ok_or_else(|| AppError::no_available_candidates(pull_request_id))?;

        self.pull_requests
            .swap_reviewer(pull_request_id, old_reviewer_id, replacement.id)
            .await
            .map_err(|e| {
                storage_failure(
                    COMPONENT,
                    e,
                    format!(
                        "swap_reviewer({}, {} -> {})",
                        pull_request_id, old_reviewer_id, replacement.id
                    ),
                )
            })?;

        pr.assigned_reviewers[position] = replacement.id;

        log::info!(
            "[pull_requests] Reassigned {} from {} to {}",
            pull_request_id,
            old_reviewer_id,
            replacement.id
        );

        Ok(ReassignOutcome {
            pull_request: pr,
            replaced_by: replacement.id,
        })
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

    async fn pull_request_exists(&self, pull_request_id: i64) -> Result<bool, AppError> {
        self.pull_requests
            .pull_request_exists(pull_request_id)
            .await
            .map_err(|e| {
                storage_failure(COMPONENT, e, format!("pull_request_exists({})", pull_request_id))
            })
    }

    async fn load(&self, pull_request_id: i64) -> Result<PullRequest, AppError> {
        self.pull_requests
            .get_pull_request(pull_request_id)
            .await
            .map_err(|e| {
                storage_failure(COMPONENT, e, format!("get_pull_request({})", pull_request_id))
            })
    }

    /// Active teammates of the author minus the author and `excluded`.
    async fn eligible_reviewers(
        &self,
        author_id: i64,
        excluded: &[i64],
    ) -> Result<Vec<User>, AppError> {
        let mut candidates = self
            .pull_requests
            .active_teammates_excluding_author(author_id)
            .await
            .map_err(|e| {
                let operation = format!("active_teammates_excluding_author({})", author_id);
                storage_failure(COMPONENT, e, operation)
            })?;

        candidates.retain(|u| u.id != author_id && !excluded.contains(&u.id));
        Ok(candidates)
    }
}
