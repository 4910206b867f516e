use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

use auth::prelude::*;

use crate::error::ApiResult;
use crate::extract::{parse_id, JsonBody};
use crate::middleware::CurrentAdmin;
use crate::response;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AdminAuthResponse {
    pub token: String,
    pub admin: Admin,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<AdminLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (token, admin) = state.admin_service.login(&payload).await?;
    Ok(response::ok(AdminAuthResponse { token, admin }))
}

/// GET /api/admin/me
pub async fn me(CurrentAdmin(admin): CurrentAdmin) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(admin))
}

/// POST /api/admin
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(actor): CurrentAdmin,
    JsonBody(payload): JsonBody<CreateAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = state.admin_service.create(&actor, payload).await?;
    Ok(response::created(admin))
}

/// GET /api/admin
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(_actor): CurrentAdmin,
) -> ApiResult<impl IntoResponse> {
    Ok(response::ok(state.admin_service.list().await?))
}

/// GET /api/admin/{id}
pub async fn get_admin(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(_actor): CurrentAdmin,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "admin")?;
    Ok(response::ok(state.admin_service.get(id).await?))
}

/// PUT /api/admin/{id}
pub async fn update_admin(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(actor): CurrentAdmin,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateAdminRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "admin")?;
    let admin = state.admin_service.update(&actor, id, payload).await?;
    Ok(response::ok(admin))
}

/// DELETE /api/admin/{id}
pub async fn delete_admin(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(actor): CurrentAdmin,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "admin")?;
    state.admin_service.delete(&actor, id).await?;
    Ok(response::message("Admin deleted successfully"))
}
