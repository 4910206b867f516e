use crate::{
    error::{AuthError, Result},
    jwt::{generate_token, validate_token, TokenSubject},
    model::{Admin, AdminChanges, AdminRole, AdminStatus, NewAdmin},
    password::{hash_password, verify_password},
    policy::{self, StatusPolicy},
    request::{AdminLoginRequest, CreateAdminRequest, UpdateAdminRequest},
    store::AdminStore,
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Admin sessions and the admin lifecycle
///
/// Every privilege decision is made against records loaded for the current
/// call; nothing about roles or status is cached.
pub struct AdminService {
    admins: AdminStore,
    jwt_secret: String,
    token_expiry_seconds: i64,
}

impl AdminService {
    pub fn new(pool: SqlitePool, jwt_secret: String, token_expiry_seconds: i64) -> Self {
        Self {
            admins: AdminStore::new(pool),
            jwt_secret,
            token_expiry_seconds,
        }
    }

    /// Login with email and return a session token
    pub async fn login(&self, request: &AdminLoginRequest) -> Result<(String, Admin)> {
        request.validate()?;

        let mut admin = self
            .admins
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !admin.can_authenticate() {
            tracing::info!(admin_id = admin.id, "login rejected: admin not active");
            return Err(AuthError::AccountInactive);
        }

        if !verify_password(&request.password, &admin.password_hash)? {
            tracing::info!(admin_id = admin.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        match self.admins.touch_last_login(admin.id, now).await {
            Ok(()) => admin.last_login = Some(now),
            Err(e) => tracing::warn!(admin_id = admin.id, error = %e, "failed to record last login"),
        }

        let token = generate_token(
            &TokenSubject::Admin {
                id: admin.id,
                role: admin.role,
            },
            &self.jwt_secret,
            self.token_expiry_seconds,
        )?;

        tracing::info!(admin_id = admin.id, role = admin.role.as_str(), "admin logged in");
        Ok((token, admin))
    }

    /// Resolve a bearer token to a freshly loaded, active admin
    ///
    /// The role in the token is informational only; the stored role wins.
    pub async fn authenticate(&self, token: &str) -> Result<Admin> {
        let claims = validate_token(token, &self.jwt_secret).inspect_err(|e| {
            tracing::debug!(error = %e, "admin token rejected");
        })?;

        let id = match claims.subject()? {
            TokenSubject::Admin { id, .. } => id,
            _ => return Err(AuthError::Unauthorized("Invalid admin token".to_string())),
        };

        let admin = self
            .admins
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Admin not found".to_string()))?;

        if !admin.can_act() {
            return Err(AuthError::Unauthorized("Admin account is not active".to_string()));
        }

        Ok(admin)
    }

    /// Whether `admin` is the earliest live super admin
    pub async fn is_first_super_admin(&self, admin: &Admin) -> Result<bool> {
        if !admin.is_super_admin() {
            return Ok(false);
        }
        let first = self.admins.earliest_by_role(AdminRole::SuperAdmin).await?;
        Ok(first.is_some_and(|first| first.id == admin.id))
    }

    async fn first_super_admin_exists(&self) -> Result<bool> {
        Ok(self.admins.count_by_role(AdminRole::SuperAdmin).await? > 0)
    }

    pub async fn create(&self, actor: &Admin, request: CreateAdminRequest) -> Result<Admin> {
        policy::require_super_admin(actor).inspect_err(|e| deny(actor, "create", e))?;

        let request = request.validate()?;

        policy::authorize_create_role(request.role, self.first_super_admin_exists().await?)
            .inspect_err(|e| deny(actor, "create", e))?;

        if self.admins.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let admin = self
            .admins
            .insert(&NewAdmin {
                email: request.email,
                name: request.name,
                password_hash: hash_password(&request.password)?,
                role: request.role,
                status: request.status,
            })
            .await?;

        tracing::info!(
            actor_id = actor.id,
            admin_id = admin.id,
            role = admin.role.as_str(),
            "admin created"
        );
        Ok(admin)
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        Ok(self.admins.list().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Admin> {
        self.admins.find_by_id(id).await?.ok_or_else(admin_not_found)
    }

    /// Update another admin, or yourself
    ///
    /// Guards run in order: target access, field validation, email
    /// collision, then role and status rules. Callers without access to the
    /// target get `Forbidden` whatever the payload holds.
    pub async fn update(&self, actor: &Admin, id: i64, request: UpdateAdminRequest) -> Result<Admin> {
        let target = self.get(id).await?;
        let target_is_first = self.is_first_super_admin(&target).await?;

        policy::authorize_update_target(actor, &target, target_is_first)
            .inspect_err(|e| deny(actor, "update", e))?;

        let update = request.validate()?;

        let email = update.email.clone().filter(|email| *email != target.email);
        if let Some(email) = &email {
            if self.admins.email_taken_by_other(email, target.id).await? {
                return Err(AuthError::EmailExists);
            }
        }

        if update.touches_privileges() {
            policy::authorize_privilege_change(actor, &target, target_is_first, &update)
                .inspect_err(|e| deny(actor, "update", e))?;
        }

        let password_hash = update.password.as_deref().map(hash_password).transpose()?;
        let changes = AdminChanges {
            email,
            name: update.name,
            password_hash,
            role: update.role,
            status: update.status,
        };
        if changes.is_empty() {
            return Ok(target);
        }

        let updated = self
            .admins
            .update(target.id, &changes)
            .await?
            .ok_or_else(admin_not_found)?;

        tracing::info!(actor_id = actor.id, admin_id = updated.id, "admin updated");
        Ok(updated)
    }

    /// Soft-delete an admin
    pub async fn delete(&self, actor: &Admin, id: i64) -> Result<()> {
        policy::authorize_delete(actor, id).inspect_err(|e| deny(actor, "delete", e))?;

        let target = self.get(id).await?;
        policy::authorize_delete_target(self.is_first_super_admin(&target).await?)
            .inspect_err(|e| deny(actor, "delete", e))?;

        if !self.admins.soft_delete(target.id).await? {
            return Err(admin_not_found());
        }

        tracing::info!(actor_id = actor.id, admin_id = target.id, "admin deleted");
        Ok(())
    }

    /// Create the root super admin when no admin exists yet
    ///
    /// Returns `None` if admins are already present.
    pub async fn seed_first_super_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Option<Admin>> {
        if self.admins.count().await? > 0 {
            return Ok(None);
        }

        let request = CreateAdminRequest {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            role: AdminRole::SuperAdmin.as_str().to_string(),
            status: AdminStatus::Active.as_str().to_string(),
        }
        .validate()?;

        let admin = self
            .admins
            .insert(&NewAdmin {
                email: request.email,
                name: request.name,
                password_hash: hash_password(&request.password)?,
                role: request.role,
                status: request.status,
            })
            .await?;

        tracing::info!(admin_id = admin.id, email = %admin.email, "seeded first super admin");
        Ok(Some(admin))
    }
}

fn admin_not_found() -> AuthError {
    AuthError::NotFound("Admin not found".to_string())
}

fn deny(actor: &Admin, action: &str, err: &AuthError) {
    tracing::warn!(actor_id = actor.id, action, reason = %err, "admin action denied");
}
