use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;
use auth::{Admin, User};

/// Pull the bearer token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing or invalid Authorization header"))
}

/// Extractor for the authenticated user
///
/// The token is verified and the user re-loaded on every request, so a ban
/// takes effect immediately.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state.auth_service.authenticate(token).await?;
        Ok(Self(user))
    }
}

/// Extractor for the authenticated, active admin
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

impl FromRequestParts<Arc<AppState>> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let admin = state.admin_service.authenticate(token).await?;
        Ok(Self(admin))
    }
}
