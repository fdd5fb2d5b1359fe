//! Business logic and HTTP services.
//!
//! - `store`: storage traits and their SQLite implementation
//! - `reviewer_picker`: random reviewer selection
//! - `pull_requests`, `teams`, `users`: use cases
//! - `ids`, `api`, `server`: the HTTP adapter
//!
//! Use cases depend only on the store traits, so they are testable without
//! a database.

pub mod api;
pub mod ids;
pub mod pull_requests;
pub mod reviewer_picker;
pub mod server;
pub mod store;
pub mod teams;
pub mod users;

use crate::db::DbError;
use crate::error::AppError;

pub use pull_requests::PullRequestService;
pub use reviewer_picker::{RandomPicker, ReviewerPicker, SeededPicker};
pub use store::{PullRequestStore, SqliteStore, TeamStore, UserStore};
pub use teams::TeamService;
pub use users::UserService;

/// Log a storage failure under `component` and wrap it with the operation
/// that hit it, e.g. `"get_pull_request(42)"`.
pub(crate) fn storage_failure(component: &str, err: DbError, operation: String) -> AppError {
    log::error!("[{}] {} failed: {}", component, operation, err);
    AppError::storage(err.to_string(), operation)
}
