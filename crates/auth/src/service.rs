use crate::{
    error::{AuthError, Result},
    jwt::{generate_token, validate_token, TokenSubject},
    model::{NewUser, User},
    password::{hash_password, verify_password},
    policy::StatusPolicy,
    request::{LoginRequest, RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest},
    store::UserStore,
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Registration, login and self-service for regular users
pub struct AuthService {
    users: UserStore,
    jwt_secret: String,
    token_expiry_seconds: i64,
}

impl AuthService {
    /// Create a new AuthService
    ///
    /// # Arguments
    /// * `pool` - Store connection pool
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `token_expiry_seconds` - Session lifetime in seconds
    pub fn new(pool: SqlitePool, jwt_secret: String, token_expiry_seconds: i64) -> Self {
        Self {
            users: UserStore::new(pool),
            jwt_secret,
            token_expiry_seconds,
        }
    }

    /// Register a new active user
    ///
    /// Username collisions are reported before email collisions.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        request.validate()?;

        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::UsernameExists);
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash_password(&request.password)?;

        // The unique indexes still decide concurrent registrations
        let user = self
            .users
            .insert(&NewUser {
                username: request.username.clone(),
                email: request.email.clone(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Login with username or email and return a session token
    pub async fn login(&self, request: &LoginRequest) -> Result<(String, User)> {
        request.validate()?;

        let mut user = self
            .users
            .find_by_identifier(&request.identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_authenticate() {
            tracing::info!(user_id = user.id, "login rejected: user banned");
            return Err(AuthError::UserBanned);
        }

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        match self.users.touch_last_login(user.id, now).await {
            Ok(()) => user.last_login = Some(now),
            Err(e) => tracing::warn!(user_id = user.id, error = %e, "failed to record last login"),
        }

        let token = generate_token(
            &TokenSubject::User {
                id: user.id,
                username: user.username.clone(),
            },
            &self.jwt_secret,
            self.token_expiry_seconds,
        )?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok((token, user))
    }

    /// Resolve a bearer token to a freshly loaded user allowed to act
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = validate_token(token, &self.jwt_secret).inspect_err(|e| {
            tracing::debug!(error = %e, "user token rejected");
        })?;

        let id = match claims.subject()? {
            TokenSubject::User { id, .. } => id,
            _ => return Err(AuthError::Unauthorized("Invalid user token".to_string())),
        };

        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User not found".to_string()))?;

        if !user.can_act() {
            return Err(AuthError::Unauthorized("User is banned".to_string()));
        }

        Ok(user)
    }

    pub async fn me(&self, user_id: i64) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    /// Change username and/or email
    pub async fn update_profile(&self, user: &User, request: &UpdateProfileRequest) -> Result<User> {
        request.validate()?;

        let username = request.username.as_deref().filter(|u| *u != user.username);
        let email = request.email.as_deref().filter(|e| *e != user.email);

        if let Some(username) = username {
            if self.users.find_by_username(username).await?.is_some() {
                return Err(AuthError::UsernameExists);
            }
        }
        if let Some(email) = email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(AuthError::EmailExists);
            }
        }

        self.users
            .update_profile(user.id, username, email)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    /// Change password after re-verifying the current one
    pub async fn update_password(&self, user: &User, request: &UpdatePasswordRequest) -> Result<()> {
        request.validate()?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        let password_hash = hash_password(&request.new_password)?;
        if !self.users.update_password(user.id, &password_hash).await? {
            return Err(AuthError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = user.id, "user password changed");
        Ok(())
    }
}
