use thiserror::Error;

/// Which unique field a write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Username,
    Email,
}

/// Errors raised by the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("unique constraint violated on {0:?}")]
    Conflict(ConflictField),

    #[error("a super admin already exists")]
    SuperAdminExists,
}

/// Machine-readable error codes exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    UsernameExists,
    EmailExists,
    InvalidCredentials,
    UserBanned,
    AccountInactive,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::UsernameExists => "USERNAME_EXISTS",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserBanned => "USER_BANNED",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::ServerError => "SERVER_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameExists,

    #[error("Email already exists")]
    EmailExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("User is banned")]
    UserBanned,

    #[error("Account is not active")]
    AccountInactive,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Stored password digest is malformed")]
    MalformedDigest,

    #[error("Token generation failed: {0}")]
    TokenGenerationError(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::UsernameExists => ErrorCode::UsernameExists,
            Self::EmailExists => ErrorCode::EmailExists,
            Self::InvalidCredentials | Self::IncorrectPassword => ErrorCode::InvalidCredentials,
            Self::UserBanned => ErrorCode::UserBanned,
            Self::AccountInactive => ErrorCode::AccountInactive,
            Self::Unauthorized(_)
            | Self::TokenExpired
            | Self::BadSignature
            | Self::MalformedToken(_) => ErrorCode::Unauthorized,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::HashingError(_)
            | Self::MalformedDigest
            | Self::TokenGenerationError(_)
            | Self::Store(_) => ErrorCode::ServerError,
        }
    }

    pub(crate) fn forbidden(message: &str) -> Self {
        Self::Forbidden(message.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(ConflictField::Username) => Self::UsernameExists,
            StoreError::Conflict(ConflictField::Email) => Self::EmailExists,
            StoreError::SuperAdminExists => {
                Self::forbidden("Cannot create another super admin while first super admin exists")
            }
            other => Self::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
