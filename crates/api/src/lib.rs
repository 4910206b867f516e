pub mod router;
pub mod state;
pub mod error;
pub mod response;
pub mod extract;
pub mod auth_handlers;
pub mod admin_handlers;
pub mod middleware;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
