//! Handlers for the `/sms-logs` resource.
//!
//! The SMS gateway is external; clients record what it reported here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use policydesk_core::error::CoreError;
use policydesk_core::sms::{normalize_phone, validate_message};
use policydesk_core::types::DbId;
use policydesk_db::models::sms_log::{CreateSmsLog, SmsLog};
use policydesk_db::repositories::SmsLogRepo;
use policydesk_events::bus::{SMS_LOG_CREATED, SMS_LOG_READ};
use policydesk_events::ChangeEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{non_blank, PaginationParams};
use crate::response::{CountResponse, DataResponse};
use crate::state::AppState;

/// Status recorded when the client does not report one.
const DEFAULT_SMS_STATUS: &str = "sent";

/// Longest accepted gateway status string.
const MAX_STATUS_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /sms-logs`.
#[derive(Debug, Default, Deserialize)]
pub struct SmsLogQuery {
    /// If `true`, return only unread entries. Defaults to `false`.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /sms-logs`.
#[derive(Debug, Deserialize)]
pub struct CreateSmsLogRequest {
    pub phone_number: String,
    pub message: String,
    pub cost: Option<f64>,
    pub status: Option<String>,
}

impl CreateSmsLogRequest {
    pub fn validate(self) -> Result<CreateSmsLog, CoreError> {
        let cost = self.cost.unwrap_or(0.0);
        validate_message(&self.message, cost)?;
        let status =
            non_blank(self.status.as_deref()).unwrap_or_else(|| DEFAULT_SMS_STATUS.to_string());
        if status.len() > MAX_STATUS_LENGTH {
            return Err(CoreError::Validation(format!(
                "status must be at most {MAX_STATUS_LENGTH} characters"
            )));
        }
        Ok(CreateSmsLog {
            phone_number: normalize_phone(&self.phone_number)?,
            message: self.message,
            cost,
            status,
        })
    }
}

/// Body of `POST /sms-logs/read-all`.
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/sms-logs?unread_only=&limit=&offset=
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SmsLogQuery>,
) -> AppResult<Json<DataResponse<Vec<SmsLog>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let logs = SmsLogRepo::list(
        &state.pool,
        params.unread_only.unwrap_or(false),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: logs }))
}

/// POST /api/v1/sms-logs
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSmsLogRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SmsLog>>)> {
    let input = input.validate()?;
    let log = SmsLogRepo::create(&state.pool, &input).await?;

    tracing::info!(sms_log_id = log.id, user_id = auth.user_id, status = %log.status, "SMS log recorded");
    state.event_bus.publish(
        ChangeEvent::new(SMS_LOG_CREATED)
            .with_source(log.id)
            .with_actor(auth.user_id)
            .with_payload(&log),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: log })))
}

/// GET /api/v1/sms-logs/unread-count
pub async fn unread_count(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CountResponse>>> {
    let count = SmsLogRepo::unread_count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: CountResponse { count },
    }))
}

/// POST /api/v1/sms-logs/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SmsLog>>> {
    let log = SmsLogRepo::mark_read(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SmsLog",
            id,
        }))?;

    state.event_bus.publish(
        ChangeEvent::new(SMS_LOG_READ)
            .with_source(id)
            .with_actor(auth.user_id),
    );
    Ok(Json(DataResponse { data: log }))
}

/// POST /api/v1/sms-logs/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkAllReadResponse>>> {
    let updated = SmsLogRepo::mark_all_read(&state.pool).await?;

    if updated > 0 {
        tracing::debug!(updated, user_id = auth.user_id, "SMS logs marked read");
        state
            .event_bus
            .publish(ChangeEvent::new(SMS_LOG_READ).with_actor(auth.user_id));
    }
    Ok(Json(DataResponse {
        data: MarkAllReadResponse { updated },
    }))
}
