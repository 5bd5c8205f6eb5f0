//! Route definitions for the `/policies` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::policy;
use crate::state::AppState;

/// Routes mounted at `/policies`.
///
/// ```text
/// GET    /             -> list (?company, bucket, q, limit, offset)
/// POST   /             -> create
/// GET    /export       -> export (CSV)
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete (admin only)
/// POST   /{id}/renew   -> renew
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(policy::list).post(policy::create))
        .route("/export", get(policy::export))
        .route(
            "/{id}",
            get(policy::get_by_id)
                .put(policy::update)
                .delete(policy::delete),
        )
        .route("/{id}/renew", post(policy::renew))
}
