//! `AuthUser` extractor — reads the caller identity from `X-User-Id`.
//!
//! Authentication and session handling terminate at the gateway in front
//! of this service; by the time a request arrives here the user id header
//! is trusted. A missing or malformed header is a malformed request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use hibi_core::error::AppError;

use crate::error::ApiError;
use hibi_core::types::id::UserId;

use crate::state::AppState;

/// Extracted caller identity available in handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing X-User-Id header"))?;

        let user_id: UserId = header
            .parse()
            .map_err(|_| AppError::validation("X-User-Id must be a UUID"))?;

        Ok(AuthUser(user_id))
    }
}
