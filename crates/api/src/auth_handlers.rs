use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

use auth::prelude::*;

use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::middleware::CurrentUser;
use crate::response;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth_service.register(&payload).await?;
    Ok(response::created(user))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (token, user) = state.auth_service.login(&payload).await?;
    Ok(response::ok(AuthResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(state.auth_service.me(user.id).await?))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth_service.update_profile(&user, &payload).await?;
    Ok(response::ok(user))
}

/// PUT /api/auth/password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(payload): JsonBody<UpdatePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    state.auth_service.update_password(&user, &payload).await?;
    Ok(response::message("Password updated successfully"))
}
