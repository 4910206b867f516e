use auth::{AdminService, AuthService};

/// Application state shared across all handlers
pub struct AppState {
    pub auth_service: AuthService,
    pub admin_service: AdminService,
}

impl AppState {
    pub fn new(auth_service: AuthService, admin_service: AdminService) -> Self {
        Self {
            auth_service,
            admin_service,
        }
    }
}
