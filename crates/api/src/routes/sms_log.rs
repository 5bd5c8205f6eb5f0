//! Route definitions for the `/sms-logs` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sms_log;
use crate::state::AppState;

/// Routes mounted at `/sms-logs`.
///
/// ```text
/// GET    /                -> list (?unread_only, limit, offset)
/// POST   /                -> create
/// GET    /unread-count    -> unread_count
/// POST   /{id}/read       -> mark_read
/// POST   /read-all        -> mark_all_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sms_log::list).post(sms_log::create))
        .route("/unread-count", get(sms_log::unread_count))
        .route("/{id}/read", post(sms_log::mark_read))
        .route("/read-all", post(sms_log::mark_all_read))
}
