//! Wire identifiers and request field checks.
//!
//! Users travel as `u<digits>` and pull requests as `pr-<digits>`; the
//! domain only ever sees the integer part.

use crate::error::AppError;

const USER_PREFIX: &str = "u";
const PULL_REQUEST_PREFIX: &str = "pr-";

fn parse_prefixed(raw: &str, prefix: &str) -> Option<i64> {
    let digits = raw.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parse `u123` into `123`.
pub fn parse_user_id(raw: &str, field: &str) -> Result<i64, AppError> {
    parse_prefixed(raw, USER_PREFIX)
        .ok_or_else(|| AppError::invalid_input_field(format!("invalid user id '{}'", raw), field))
}

/// Parse `pr-42` into `42`.
pub fn parse_pull_request_id(raw: &str, field: &str) -> Result<i64, AppError> {
    parse_prefixed(raw, PULL_REQUEST_PREFIX).ok_or_else(|| {
        AppError::invalid_input_field(format!("invalid pull request id '{}'", raw), field)
    })
}

pub fn format_user_id(id: i64) -> String {
    format!("{}{}", USER_PREFIX, id)
}

pub fn format_pull_request_id(id: i64) -> String {
    format!("{}{}", PULL_REQUEST_PREFIX, id)
}

/// Reject empty or whitespace-only text.
pub fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            format!("{} cannot be empty", field),
            field,
        ));
    }
    Ok(())
}
