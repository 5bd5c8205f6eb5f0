//! Handlers for the `/policies` resource.
//!
//! Every policy returned by these handlers carries its derived `bucket` and
//! `lifecycle`, computed against the business date of the request.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use policydesk_core::csv;
use policydesk_core::error::CoreError;
use policydesk_core::expiry::{bucket_range, classify, parse_date, require_date, ExpiryBucket};
use policydesk_core::lifecycle::{lifecycle_state, renew as plan_renewal, LifecycleState};
use policydesk_core::policy::{
    normalize_plate, require_text, validate_term, PolicyRecord, MAX_TEXT_LENGTH,
};
use policydesk_core::types::{CalendarDate, DbId};
use policydesk_db::models::policy::{CreatePolicy, Policy, PolicyFilter, UpdatePolicy};
use policydesk_db::repositories::PolicyRepo;
use policydesk_events::bus::{POLICY_CREATED, POLICY_DELETED, POLICY_RENEWED, POLICY_UPDATED};
use policydesk_events::ChangeEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{non_blank, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Column order of the CSV export.
const EXPORT_HEADER: &[&str] = &[
    "id",
    "plate",
    "owner",
    "contact",
    "company",
    "start_date",
    "expiry_date",
    "bucket",
    "lifecycle",
    "followup_status",
    "renewed_date",
];

// ---------------------------------------------------------------------------
// Response view
// ---------------------------------------------------------------------------

/// A stored policy plus its derived classification.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyView {
    #[serde(flatten)]
    pub policy: Policy,
    pub bucket: ExpiryBucket,
    pub lifecycle: LifecycleState,
}

impl PolicyView {
    pub fn new(policy: Policy, today: CalendarDate) -> Self {
        let bucket = classify(policy.expiry_date, today);
        let lifecycle = lifecycle_state(policy.expiry_date, policy.renewed_date, today);
        Self {
            policy,
            bucket,
            lifecycle,
        }
    }
}

impl PolicyRecord for PolicyView {
    fn expiry_date(&self) -> CalendarDate {
        self.policy.expiry_date
    }

    fn renewed_date(&self) -> Option<CalendarDate> {
        self.policy.renewed_date
    }

    fn company(&self) -> &str {
        &self.policy.company
    }
}

pub(crate) fn policy_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Policy",
        id,
    })
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /policies`.
#[derive(Debug, Default, Deserialize)]
pub struct ListPoliciesParams {
    pub company: Option<String>,
    pub bucket: Option<String>,
    /// Free-text search over plate, owner and contact.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /policies/export`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub company: Option<String>,
    pub bucket: Option<String>,
}

/// Build a row filter from raw query values.
///
/// Unknown bucket names are a validation error rather than an empty result.
pub fn build_filter(
    company: Option<&str>,
    bucket: Option<&str>,
    search: Option<&str>,
    today: CalendarDate,
) -> Result<PolicyFilter, CoreError> {
    let (expires_after, expires_until) = match non_blank(bucket) {
        Some(name) => bucket_range(ExpiryBucket::from_str_value(&name)?, today),
        None => (None, None),
    };
    Ok(PolicyFilter {
        company: non_blank(company),
        expires_after,
        expires_until,
        search: non_blank(search),
    })
}

/// Request body for `POST /policies`.
///
/// Dates arrive as strings so malformed values surface as validation errors
/// naming the field.
#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub company: String,
    pub start_date: Option<String>,
    pub expiry_date: Option<String>,
}

impl CreatePolicyRequest {
    pub fn validate(self) -> Result<CreatePolicy, CoreError> {
        let start_date = require_date(self.start_date.as_deref(), "start_date")?;
        let expiry_date = require_date(self.expiry_date.as_deref(), "expiry_date")?;
        validate_term(start_date, expiry_date)?;
        Ok(CreatePolicy {
            plate: normalize_plate(&self.plate)?,
            owner: require_text(&self.owner, "owner")?,
            contact: optional_text(&self.contact, "contact")?,
            company: require_text(&self.company, "company")?,
            start_date,
            expiry_date,
        })
    }
}

/// Request body for `PUT /policies/{id}`. Absent fields are left unchanged.
///
/// `expiry_date` is accepted only when it repeats the stored value, so
/// clients that send the whole record keep working. Moving the expiry is a
/// renewal and goes through `POST /policies/{id}/renew`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePolicyRequest {
    pub plate: Option<String>,
    pub owner: Option<String>,
    pub contact: Option<String>,
    pub company: Option<String>,
    pub start_date: Option<String>,
    pub expiry_date: Option<String>,
}

impl UpdatePolicyRequest {
    /// Validate against the stored row's expiry date.
    pub fn validate(self, current_expiry: CalendarDate) -> Result<UpdatePolicy, CoreError> {
        if let Some(value) = self.expiry_date.as_deref() {
            if parse_date(value, "expiry_date")? != current_expiry {
                return Err(CoreError::Conflict(
                    "expiry_date can only change by renewal (POST /policies/{id}/renew)".into(),
                ));
            }
        }

        let start_date = self
            .start_date
            .as_deref()
            .map(|v| parse_date(v, "start_date"))
            .transpose()?;
        if let Some(start) = start_date {
            validate_term(start, current_expiry)?;
        }

        Ok(UpdatePolicy {
            plate: self.plate.as_deref().map(normalize_plate).transpose()?,
            owner: self.owner.as_deref().map(|v| require_text(v, "owner")).transpose()?,
            contact: self
                .contact
                .as_deref()
                .map(|v| optional_text(v, "contact"))
                .transpose()?,
            company: self
                .company
                .as_deref()
                .map(|v| require_text(v, "company"))
                .transpose()?,
            start_date,
        })
    }
}

/// Request body for `POST /policies/{id}/renew`.
#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    pub expiry_date: Option<String>,
}

/// Contact details may be blank but are length-limited like other text.
fn optional_text(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/policies?company=&bucket=&q=&limit=&offset=
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListPoliciesParams>,
) -> AppResult<Json<DataResponse<Vec<PolicyView>>>> {
    let today = state.today();
    let filter = build_filter(
        params.company.as_deref(),
        params.bucket.as_deref(),
        params.q.as_deref(),
        today,
    )?;
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let policies = PolicyRepo::list(&state.pool, &filter, limit, offset).await?;
    let data = policies
        .into_iter()
        .map(|p| PolicyView::new(p, today))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/policies
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePolicyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PolicyView>>)> {
    let input = input.validate()?;
    let policy = PolicyRepo::create(&state.pool, &input).await?;

    tracing::info!(policy_id = policy.id, user_id = auth.user_id, plate = %policy.plate, "Policy created");
    let view = PolicyView::new(policy, state.today());
    state.policies_changed(
        ChangeEvent::new(POLICY_CREATED)
            .with_source(view.policy.id)
            .with_actor(auth.user_id)
            .with_payload(&view),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/policies/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PolicyView>>> {
    let policy = PolicyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| policy_not_found(id))?;
    Ok(Json(DataResponse {
        data: PolicyView::new(policy, state.today()),
    }))
}

/// PUT /api/v1/policies/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePolicyRequest>,
) -> AppResult<Json<DataResponse<PolicyView>>> {
    let existing = PolicyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| policy_not_found(id))?;
    let input = input.validate(existing.expiry_date)?;

    let policy = PolicyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| policy_not_found(id))?;

    tracing::info!(policy_id = id, user_id = auth.user_id, "Policy updated");
    let view = PolicyView::new(policy, state.today());
    state.policies_changed(
        ChangeEvent::new(POLICY_UPDATED)
            .with_source(id)
            .with_actor(auth.user_id)
            .with_payload(&view),
    );

    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/policies/{id}
///
/// Hard delete, Admin only.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PolicyRepo::hard_delete(&state.pool, id).await? {
        return Err(policy_not_found(id));
    }

    tracing::info!(policy_id = id, user_id = admin.user_id, "Policy deleted");
    state.policies_changed(
        ChangeEvent::new(POLICY_DELETED)
            .with_source(id)
            .with_actor(admin.user_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/policies/{id}/renew
///
/// Renew an expired policy with a new expiry date in the future.
pub async fn renew(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RenewRequest>,
) -> AppResult<Json<DataResponse<PolicyView>>> {
    let new_expiry = require_date(input.expiry_date.as_deref(), "expiry_date")?;
    let today = state.today();

    let existing = PolicyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| policy_not_found(id))?;
    let current = lifecycle_state(existing.expiry_date, existing.renewed_date, today);
    let renewal = plan_renewal(current, new_expiry, today)?;

    // The row may have been renewed by someone else since it was read.
    let policy = PolicyRepo::renew(&state.pool, id, renewal.expiry_date, renewal.renewed_date)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Policy {id} was renewed concurrently"
            )))
        })?;

    tracing::info!(
        policy_id = id,
        user_id = auth.user_id,
        expiry_date = %renewal.expiry_date,
        bucket = renewal.bucket.as_str(),
        "Policy renewed",
    );
    let view = PolicyView::new(policy, today);
    state.policies_changed(
        ChangeEvent::new(POLICY_RENEWED)
            .with_source(id)
            .with_actor(auth.user_id)
            .with_payload(&view),
    );

    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/policies/export?company=&bucket=
///
/// Download matching policies as CSV, soonest expiry first.
pub async fn export(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let today = state.today();
    let filter = build_filter(params.company.as_deref(), params.bucket.as_deref(), None, today)?;
    let policies = PolicyRepo::list_all(&state.pool, &filter).await?;

    let body = csv::render(
        EXPORT_HEADER,
        policies.into_iter().map(|p| export_row(PolicyView::new(p, today))),
    );
    let disposition = format!(
        "attachment; filename=\"{}\"",
        csv::export_filename("policies", today)
    );

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

fn export_row(view: PolicyView) -> Vec<String> {
    let p = view.policy;
    vec![
        p.id.to_string(),
        p.plate,
        p.owner,
        p.contact,
        p.company,
        p.start_date.to_string(),
        p.expiry_date.to_string(),
        view.bucket.as_str().to_string(),
        view.lifecycle.as_str().to_string(),
        p.followup_status,
        p.renewed_date.map(|d| d.to_string()).unwrap_or_default(),
    ]
}
