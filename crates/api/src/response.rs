//! Shared response envelope types for API handlers.
//!
//! Entity responses use a `{ "data": ... }` envelope. Dashboard reports keep
//! their own top-level shapes because the charts consume them directly.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "count": n }` payload for counter endpoints.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}
