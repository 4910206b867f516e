// Core modules
mod error;
mod password;
mod jwt;
pub mod policy;

// Store-backed modules
pub mod db;
pub mod migrations;
pub mod model;
pub mod request;
pub mod store;
pub mod service;
pub mod admin_service;

// Re-export error types
pub use error::{AuthError, ConflictField, ErrorCode, Result, StoreError};

// Re-export crypto primitives
pub use password::{hash_password, verify_password};
pub use jwt::{generate_token, validate_token, Claims, SubjectKind, TokenSubject};

pub use model::{Admin, AdminRole, AdminStatus, Lifecycle, User, UserStatus};
pub use service::AuthService;
pub use admin_service::AdminService;

/// Session lifetime used for both users and admins
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AuthError, ErrorCode, Result,
        AuthService, AdminService,
        User, Admin, AdminRole, AdminStatus, UserStatus,
        Claims,
    };
    pub use crate::request::*;
}
