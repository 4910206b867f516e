use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::model::AdminRole;

/// Which account table a token was issued for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    User,
    Admin,
}

/// Identity a session token is minted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSubject {
    User { id: i64, username: String },
    Admin { id: i64, role: AdminRole },
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Account variant the subject ID refers to
    pub kind: SubjectKind,
    /// Admin role at issuance (admins only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    /// Username at issuance (users only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for the subject, expiring `expires_in_seconds` from now
    ///
    /// A lifetime that does not fit chrono's date range is an error.
    pub fn new(subject: &TokenSubject, expires_in_seconds: i64) -> Result<Self> {
        let now = Utc::now();
        let expiration = TimeDelta::try_seconds(expires_in_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::TokenGenerationError(format!(
                    "token lifetime of {expires_in_seconds}s is out of range"
                ))
            })?;

        let (sub, kind, role, username) = match subject {
            TokenSubject::User { id, username } => {
                (id.to_string(), SubjectKind::User, None, Some(username.clone()))
            }
            TokenSubject::Admin { id, role } => (id.to_string(), SubjectKind::Admin, Some(*role), None),
        };

        Ok(Self {
            sub,
            kind,
            role,
            username,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        })
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Numeric account ID carried in `sub`
    pub fn subject_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AuthError::MalformedToken("subject is not a numeric id".to_string()))
    }

    /// Rebuild the typed subject, rejecting claim sets that mix variants
    pub fn subject(&self) -> Result<TokenSubject> {
        let id = self.subject_id()?;
        match (self.kind, &self.role, &self.username) {
            (SubjectKind::User, None, Some(username)) => Ok(TokenSubject::User {
                id,
                username: username.clone(),
            }),
            (SubjectKind::Admin, Some(role), None) => Ok(TokenSubject::Admin { id, role: *role }),
            _ => Err(AuthError::MalformedToken(
                "claims do not match subject kind".to_string(),
            )),
        }
    }
}

/// Generate a signed JWT for an account
///
/// # Arguments
/// * `subject` - The account identity to embed
/// * `secret` - The secret key for signing the token
/// * `expires_in_seconds` - Token lifetime in seconds (e.g., 604800 for 7 days)
pub fn generate_token(subject: &TokenSubject, secret: &str, expires_in_seconds: i64) -> Result<String> {
    let claims = Claims::new(subject, expires_in_seconds)?;

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
}

/// Validate a JWT and return its claims
///
/// Expiry, signature and shape failures are reported as distinct errors.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::BadSignature,
        _ => AuthError::MalformedToken(e.to_string()),
    })?;

    let claims = token_data.claims;

    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}
