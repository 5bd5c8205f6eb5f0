pub mod auth;
pub mod followup;
pub mod health;
pub mod policy;
pub mod report;
pub mod sms_log;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket change feed
///
/// /auth/login                          login (public)
/// /auth/me                             current user
///
/// /policies                            list, create
/// /policies/export                     CSV export (GET)
/// /policies/{id}                       get, update, delete (admin only)
/// /policies/{id}/renew                 renew (POST)
///
/// /summary                             headline counts (GET)
/// /trends                              trend chart (GET)
/// /expiry-report                       expiry tabs (GET)
/// /company-distribution                insurer shares (GET)
///
/// /followup                            set status (POST)
/// /followup/{policy_id}                clear status (DELETE)
///
/// /sms-logs                            list, record (GET, POST)
/// /sms-logs/unread-count               unread count (GET)
/// /sms-logs/{id}/read                  mark read (POST)
/// /sms-logs/read-all                   mark all read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/policies", policy::router())
        // Dashboard reports sit at the top level.
        .merge(report::router())
        .nest("/followup", followup::router())
        .nest("/sms-logs", sms_log::router())
}
