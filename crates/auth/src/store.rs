//! Credential store for users and admins.
//!
//! Lookups only see live records. Uniqueness is enforced by the schema's
//! unique indexes, and violations come back as `StoreError::Conflict`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{ConflictField, StoreError};
use crate::model::{Admin, AdminChanges, AdminRole, Lifecycle, NewAdmin, NewUser, User};

type Result<T> = std::result::Result<T, StoreError>;

// =============================================================================
// Internal Row Types
// =============================================================================

const USER_COLUMNS: &str =
    "id, username, email, password_hash, status, last_login, created_at, updated_at";

const ADMIN_COLUMNS: &str =
    "id, email, name, password_hash, role, status, last_login, created_at, updated_at, deleted_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    status: String,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("invalid user status: {e}")))?;

        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            status,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: i64,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    status: String,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = StoreError;

    fn try_from(row: AdminRow) -> Result<Self> {
        let role = row
            .role
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("invalid admin role: {e}")))?;
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::DataCorruption(format!("invalid admin status: {e}")))?;

        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            status,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
            lifecycle: Lifecycle::from_deleted_at(row.deleted_at),
        })
    }
}

/// Translate a unique index violation into the field it collided on.
fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            if db_err.message().contains("username") {
                StoreError::Conflict(ConflictField::Username)
            } else {
                StoreError::Conflict(ConflictField::Email)
            }
        }
        _ => StoreError::Database(err),
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} LIMIT 1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.fetch_one_where("username = ?", username).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_where("email = ?", email).await
    }

    /// Match on username first, then email
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 OR email = ?1 \
             ORDER BY CASE WHEN username = ?1 THEN 0 ELSE 1 END LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new active user
    pub async fn insert(&self, user: &NewUser) -> Result<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, status, created_at, updated_at) \
             VALUES (?, ?, ?, 'active', ?, ?) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        row.try_into()
    }

    /// Apply the present profile fields; returns `None` if the user is gone
    pub async fn update_profile(
        &self,
        id: i64,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email), \
             updated_at = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(email)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Admins
// =============================================================================

#[derive(Clone)]
pub struct AdminStore {
    pool: SqlitePool,
}

impl AdminStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ? AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE email = ? AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE deleted_at IS NULL ORDER BY id");
        let rows = sqlx::query_as::<_, AdminRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Whether a live admin other than `exclude_id` already uses `email`
    pub async fn email_taken_by_other(&self, email: &str, exclude_id: i64) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM admins WHERE email = ? AND id != ? AND deleted_at IS NULL)",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Insert a new admin.
    ///
    /// A `super_admin` row is written only if no live super admin exists; the
    /// check and the write are one statement, so concurrent creations cannot
    /// both succeed.
    pub async fn insert(&self, admin: &NewAdmin) -> Result<Admin> {
        let now = Utc::now();
        let source = if admin.role == AdminRole::SuperAdmin {
            "SELECT ?, ?, ?, ?, ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM admins WHERE role = 'super_admin' AND deleted_at IS NULL)"
        } else {
            "VALUES (?, ?, ?, ?, ?, ?, ?)"
        };
        let sql = format!(
            "INSERT INTO admins (email, name, password_hash, role, status, created_at, updated_at) \
             {source} RETURNING {ADMIN_COLUMNS}"
        );

        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(&admin.email)
            .bind(&admin.name)
            .bind(&admin.password_hash)
            .bind(admin.role.as_str())
            .bind(admin.status.as_str())
            .bind(now)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(StoreError::SuperAdminExists)?;

        row.try_into()
    }

    /// Apply a set of column changes atomically; returns `None` if the admin is gone
    pub async fn update(&self, id: i64, changes: &AdminChanges) -> Result<Option<Admin>> {
        let sql = format!(
            "UPDATE admins SET \
                email = COALESCE(?, email), \
                name = COALESCE(?, name), \
                password_hash = COALESCE(?, password_hash), \
                role = COALESCE(?, role), \
                status = COALESCE(?, status), \
                updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL RETURNING {ADMIN_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(changes.email.as_deref())
            .bind(changes.name.as_deref())
            .bind(changes.password_hash.as_deref())
            .bind(changes.role.map(|r| r.as_str()))
            .bind(changes.status.map(|s| s.as_str()))
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Mark the admin deleted. The id is never reused.
    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE admins SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn touch_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE admins SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_role(&self, role: AdminRole) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM admins WHERE role = ? AND deleted_at IS NULL",
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// The live admin of `role` created first; ids break timestamp ties
    pub async fn earliest_by_role(&self, role: AdminRole) -> Result<Option<Admin>> {
        let sql = format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE role = ? AND deleted_at IS NULL \
             ORDER BY created_at ASC, id ASC LIMIT 1"
        );
        let row = sqlx::query_as::<_, AdminRow>(&sql)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }
}
