//! Route definitions for the `/followup` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::followup;
use crate::state::AppState;

/// Routes mounted at `/followup`.
///
/// ```text
/// POST   /               -> set_status
/// DELETE /{policy_id}    -> clear_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(followup::set_status))
        .route("/{policy_id}", delete(followup::clear_status))
}
