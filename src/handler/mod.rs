use axum::{response::IntoResponse, Json};
use uuid::Uuid;

use crate::error::AppError;

pub mod auth;
pub mod events;
pub mod lists;
pub mod magic_mirror;
pub mod todos;

pub use self::auth::*;
pub use self::events::*;
pub use self::lists::*;
pub use self::magic_mirror::*;
pub use self::todos::*;

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Calendar API is running!" }))
}

/// Ids that do not parse can never match a record, so they are reported the
/// same way as a record that is missing or owned by someone else.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(not_found.to_string()))
}
