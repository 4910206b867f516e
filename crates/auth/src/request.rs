//! Inbound request shapes and their field-level validation.
//!
//! Role and status arrive as plain strings so that access checks on the
//! target account can run before the values are parsed.

use serde::Deserialize;

use crate::error::{AuthError, Result};
use crate::model::{AdminRole, AdminStatus};

pub const MIN_PASSWORD_LEN: usize = 6;
const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;
const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=100;
const MAX_EMAIL_LEN: usize = 255;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        require("identifier", &self.identifier)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<()> {
        if self.username.is_none() && self.email.is_none() {
            return Err(AuthError::Validation(
                "At least one field (username or email) must be provided".to_string(),
            ));
        }
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl UpdatePasswordRequest {
    pub fn validate(&self) -> Result<()> {
        require("current_password", &self.current_password)?;
        validate_password(&self.new_password)
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

impl AdminLoginRequest {
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub status: String,
}

/// A create request whose fields all passed validation
#[derive(Debug, Clone)]
pub struct ValidCreateAdmin {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: AdminRole,
    pub status: AdminStatus,
}

impl CreateAdminRequest {
    pub fn validate(self) -> Result<ValidCreateAdmin> {
        validate_email(&self.email)?;
        validate_name(&self.name)?;
        validate_password(&self.password)?;
        let role = parse_role(&self.role)?;
        let status = parse_status(&self.status)?;

        Ok(ValidCreateAdmin {
            email: self.email,
            name: self.name,
            password: self.password,
            role,
            status,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAdminRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// An admin update whose present fields all passed validation
#[derive(Debug, Clone, Default)]
pub struct ValidAdminUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<AdminRole>,
    pub status: Option<AdminStatus>,
}

impl ValidAdminUpdate {
    pub fn touches_privileges(&self) -> bool {
        self.role.is_some() || self.status.is_some()
    }
}

impl UpdateAdminRequest {
    pub fn validate(self) -> Result<ValidAdminUpdate> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        let role = self.role.as_deref().map(parse_role).transpose()?;
        let status = self.status.as_deref().map(parse_status).transpose()?;

        Ok(ValidAdminUpdate {
            email: self.email,
            name: self.name,
            password: self.password,
            role,
            status,
        })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AuthError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !USERNAME_LEN.contains(&len) {
        return Err(AuthError::Validation(
            "Username must be between 3 and 32 characters".to_string(),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AuthError::Validation(
            "Username must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if !NAME_LEN.contains(&len) {
        return Err(AuthError::Validation(
            "Name must be between 2 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    let invalid = || AuthError::Validation("Invalid email address".to_string());

    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

fn parse_role(role: &str) -> Result<AdminRole> {
    role.parse()
        .map_err(|_| AuthError::Validation("Invalid admin role".to_string()))
}

fn parse_status(status: &str) -> Result<AdminStatus> {
    status
        .parse()
        .map_err(|_| AuthError::Validation("Invalid admin status".to_string()))
}
