//! Dashboard report handlers.
//!
//! Reports are computed from the full policy set by the pure aggregators in
//! `policydesk_core` and served through the [`ReportCache`]. They keep
//! their own top-level JSON shapes (no `data` envelope) because the charts
//! consume them directly.
//!
//! [`ReportCache`]: crate::cache::ReportCache

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use policydesk_core::expiry::MONTH_WINDOW_DAYS;
use policydesk_core::summary::{company_distribution, expiry_report, summarize};
use policydesk_core::trends::{clamp_periods, recent_window, trends, TrendPeriod, TrendPoint};
use policydesk_core::types::CalendarDate;
use policydesk_db::models::policy::PolicyFilter;
use policydesk_db::repositories::PolicyRepo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{ReportKey, ReportKind};
use crate::error::{AppError, AppResult};
use crate::handlers::policy::PolicyView;
use crate::middleware::auth::AuthUser;
use crate::query::non_blank;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /trends`.
#[derive(Debug, Default, Deserialize)]
pub struct TrendsParams {
    /// `week`, `month` (default) or `year`.
    pub period: Option<String>,
    /// Number of most recent periods to return (default 12, max 60).
    pub limit: Option<usize>,
}

/// Query parameters for `GET /expiry-report`.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiryReportParams {
    pub company: Option<String>,
}

/// One row of the trend chart as rendered to clients.
#[derive(Debug, Serialize)]
pub struct TrendRow {
    /// Period label (`YYYY-MM`, `YYYY-Www` or `YYYY`).
    pub month: String,
    pub active: u64,
    pub expired: u64,
    pub renewed: u64,
}

impl From<TrendPoint> for TrendRow {
    fn from(point: TrendPoint) -> Self {
        Self {
            month: point.label,
            active: point.active,
            expired: point.expired,
            renewed: point.renewed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<TrendRow>,
}

/// Newest-first trend rows: the `limit` periods up to and including today's.
pub fn trend_rows(
    points: Vec<TrendPoint>,
    period: TrendPeriod,
    today: CalendarDate,
    limit: usize,
) -> Vec<TrendRow> {
    recent_window(points, period, today, limit)
        .into_iter()
        .rev()
        .map(TrendRow::from)
        .collect()
}

fn to_value<T: Serialize>(report: &T) -> Result<Value, AppError> {
    serde_json::to_value(report)
        .map_err(|e| AppError::InternalError(format!("Report serialization error: {e}")))
}

/// Unwrap a cached report for the response body.
fn respond(report: Arc<Value>) -> Json<Value> {
    Json(Arc::unwrap_or_clone(report))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/summary
///
/// Headline counts: `{created, active, expiring, expired}`.
pub async fn summary(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    let today = state.today();
    let key = ReportKey::new(ReportKind::Summary, "", today);
    let pool = state.pool.clone();

    let report = state
        .report_cache
        .get_or_try_compute(key, move || async move {
            let policies = PolicyRepo::list_all(&pool, &PolicyFilter::default()).await?;
            to_value(&summarize(&policies, today))
        })
        .await?;
    Ok(respond(report))
}

/// GET /api/v1/trends?period=&limit=
pub async fn trends_report(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrendsParams>,
) -> AppResult<Json<Value>> {
    let period = match non_blank(params.period.as_deref()) {
        Some(name) => TrendPeriod::from_str_value(&name)?,
        None => TrendPeriod::default(),
    };
    let limit = clamp_periods(params.limit);
    let today = state.today();
    let key = ReportKey::new(
        ReportKind::Trends,
        format!("{}:{limit}", period.as_str()),
        today,
    );
    let pool = state.pool.clone();

    let report = state
        .report_cache
        .get_or_try_compute(key, move || async move {
            let policies = PolicyRepo::list_all(&pool, &PolicyFilter::default()).await?;
            let points = trends(&policies, period, today);
            to_value(&TrendsResponse {
                trends: trend_rows(points, period, today, limit),
            })
        })
        .await?;
    Ok(respond(report))
}

/// GET /api/v1/expiry-report?company=
///
/// Policies in the `today`, `week`, `month` and `expired` tabs.
pub async fn expiry_report_handler(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExpiryReportParams>,
) -> AppResult<Json<Value>> {
    let today = state.today();
    let company = non_blank(params.company.as_deref());
    let key = ReportKey::new(
        ReportKind::ExpiryReport,
        company.as_deref().unwrap_or_default().to_lowercase(),
        today,
    );
    let pool = state.pool.clone();

    let report = state
        .report_cache
        .get_or_try_compute(key, move || async move {
            // Active policies never appear in the report.
            let filter = PolicyFilter {
                company,
                expires_until: Some(report_horizon(today)),
                ..PolicyFilter::default()
            };
            let policies = PolicyRepo::list_all(&pool, &filter).await?;
            let views: Vec<PolicyView> = policies
                .into_iter()
                .map(|p| PolicyView::new(p, today))
                .collect();
            to_value(&expiry_report(views, today))
        })
        .await?;
    Ok(respond(report))
}

/// GET /api/v1/company-distribution
///
/// `[{name, value, color}]`, largest insurer first.
pub async fn company_distribution_handler(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    let today = state.today();
    let key = ReportKey::new(ReportKind::CompanyDistribution, "", today);
    let pool = state.pool.clone();

    let report = state
        .report_cache
        .get_or_try_compute(key, move || async move {
            let policies = PolicyRepo::list_all(&pool, &PolicyFilter::default()).await?;
            to_value(&company_distribution(&policies))
        })
        .await?;
    Ok(respond(report))
}

/// Last expiry date that still lands in a report tab.
fn report_horizon(today: CalendarDate) -> CalendarDate {
    today + chrono::Duration::days(MONTH_WINDOW_DAYS)
}
