//! Dashboard report routes, mounted directly under `/api/v1`.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// ```text
/// GET /summary                -> summary
/// GET /trends                 -> trends_report (?period, limit)
/// GET /expiry-report          -> expiry_report_handler (?company)
/// GET /company-distribution   -> company_distribution_handler
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(report::summary))
        .route("/trends", get(report::trends_report))
        .route("/expiry-report", get(report::expiry_report_handler))
        .route(
            "/company-distribution",
            get(report::company_distribution_handler),
        )
}
