use axum::{Router, routing::{get, post, put}};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{admin_handlers, auth_handlers, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    // User routes; the CurrentUser extractor guards the protected ones
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/me", get(auth_handlers::me))
        .route("/api/auth/profile", put(auth_handlers::update_profile))
        .route("/api/auth/password", put(auth_handlers::update_password));

    // Admin routes; everything but login requires CurrentAdmin
    let admin_routes = Router::new()
        .route("/api/admin/login", post(admin_handlers::login))
        .route("/api/admin/me", get(admin_handlers::me))
        .route(
            "/api/admin",
            get(admin_handlers::list_admins).post(admin_handlers::create_admin),
        )
        .route(
            "/api/admin/{id}",
            get(admin_handlers::get_admin)
                .put(admin_handlers::update_admin)
                .delete(admin_handlers::delete_admin),
        );

    Router::new()
        .route("/", get(|| async { "Keystone API running" }))
        .merge(auth_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
