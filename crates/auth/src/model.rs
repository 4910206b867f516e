use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or requested enum value is unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

/// Account status of a regular user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Passive,
    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Passive => "passive",
            UserStatus::Banned => "banned",
        }
    }
}

impl FromStr for UserStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "passive" => Ok(UserStatus::Passive),
            "banned" => Ok(UserStatus::Banned),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Admin privilege level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Editor => "editor",
        }
    }
}

impl FromStr for AdminRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "admin" => Ok(AdminRole::Admin),
            "editor" => Ok(AdminRole::Editor),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Account status of an admin
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    Active,
    Passive,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Active => "active",
            AdminStatus::Passive => "passive",
        }
    }
}

impl FromStr for AdminStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AdminStatus::Active),
            "passive" => Ok(AdminStatus::Passive),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Whether a record is live or has been logically removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => Lifecycle::Deleted { at },
            None => Lifecycle::Active,
        }
    }
}

/// Regular user account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrator account
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub lifecycle: Lifecycle,
}

impl Admin {
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Deleted { .. })
    }
}

/// Validated data for a user about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Validated data for an admin about to be inserted
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub status: AdminStatus,
}

/// Column changes applied to an admin in a single statement.
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct AdminChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<AdminRole>,
    pub status: Option<AdminStatus>,
}

impl AdminChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_string_forms_match_storage() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Editor] {
            assert_eq!(role.as_str().parse::<AdminRole>().unwrap(), role);
        }
        for status in [UserStatus::Active, UserStatus::Passive, UserStatus::Banned] {
            assert_eq!(status.as_str().parse::<UserStatus>().unwrap(), status);
        }
        assert!("owner".parse::<AdminRole>().is_err());
        assert!("banned".parse::<AdminStatus>().is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let now = Utc::now();
        let admin = Admin {
            id: 1,
            email: "root@example.com".into(),
            name: "Root".into(),
            password_hash: "$argon2id$secret".into(),
            role: AdminRole::SuperAdmin,
            status: AdminStatus::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        };

        let json = serde_json::to_value(&admin).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("lifecycle").is_none());
        assert_eq!(json["role"], "super_admin");
        assert_eq!(json["status"], "active");
    }
}
