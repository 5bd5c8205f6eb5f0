//! Caller identity for REST handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use policydesk_core::error::CoreError;
use policydesk_core::types::DbId;

use crate::auth::jwt::{authenticate, bearer_token};
use crate::error::AppError;
use crate::state::AppState;

/// The agent behind a request, taken from its bearer token.
///
/// Handlers that take an `AuthUser` answer 401 to anonymous callers; the
/// user id is what write handlers log and stamp on change events.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            CoreError::Unauthorized("Expected an Authorization: Bearer token".into())
        })?;
        let claims = authenticate(token, &state.config.jwt)?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
