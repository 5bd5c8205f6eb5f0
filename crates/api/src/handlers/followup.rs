//! Handlers for the `/followup` resource.
//!
//! Follow-up status is independent of the expiry bucket: last write wins
//! and setting the same status twice is a no-op.

use axum::extract::{Path, State};
use axum::Json;
use policydesk_core::followup::parse_settable_status;
use policydesk_core::types::DbId;
use policydesk_db::models::policy::Policy;
use policydesk_db::repositories::PolicyRepo;
use policydesk_events::bus::POLICY_FOLLOWUP_CHANGED;
use policydesk_events::ChangeEvent;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::policy::{policy_not_found, PolicyView};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /followup`.
#[derive(Debug, Deserialize)]
pub struct SetFollowupRequest {
    pub policy_id: DbId,
    pub followup_status: String,
}

/// POST /api/v1/followup
pub async fn set_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SetFollowupRequest>,
) -> AppResult<Json<DataResponse<PolicyView>>> {
    let status = parse_settable_status(&input.followup_status)?;

    let policy = PolicyRepo::set_followup(&state.pool, input.policy_id, status.as_str())
        .await?
        .ok_or_else(|| policy_not_found(input.policy_id))?;

    tracing::info!(
        policy_id = policy.id,
        user_id = auth.user_id,
        followup_status = status.as_str(),
        "Follow-up status set",
    );
    Ok(Json(DataResponse {
        data: publish_change(&state, policy, auth.user_id),
    }))
}

/// DELETE /api/v1/followup/{policy_id}
///
/// Reset the follow-up status to `none`.
pub async fn clear_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(policy_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PolicyView>>> {
    let policy = PolicyRepo::clear_followup(&state.pool, policy_id)
        .await?
        .ok_or_else(|| policy_not_found(policy_id))?;

    tracing::info!(policy_id, user_id = auth.user_id, "Follow-up status cleared");
    Ok(Json(DataResponse {
        data: publish_change(&state, policy, auth.user_id),
    }))
}

fn publish_change(
    state: &AppState,
    policy: Policy,
    user_id: DbId,
) -> PolicyView {
    let view = PolicyView::new(policy, state.today());
    state.policies_changed(
        ChangeEvent::new(POLICY_FOLLOWUP_CHANGED)
            .with_source(view.policy.id)
            .with_actor(user_id)
            .with_payload(&view),
    );
    view
}
