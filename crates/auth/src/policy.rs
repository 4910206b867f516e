//! Account status gating and the admin privilege rules.
//!
//! Everything here is pure: callers load the records (and whether the target
//! is the first super admin) from the store at request time and pass them in.

use crate::error::{AuthError, Result};
use crate::model::{Admin, AdminRole, AdminStatus, User, UserStatus};
use crate::request::ValidAdminUpdate;

/// Whether an account may log in and keep acting on an issued session.
pub trait StatusPolicy {
    fn can_authenticate(&self) -> bool;

    /// Per-request re-check against a freshly loaded record
    fn can_act(&self) -> bool {
        self.can_authenticate()
    }
}

impl StatusPolicy for User {
    fn can_authenticate(&self) -> bool {
        self.status != UserStatus::Banned
    }
}

impl StatusPolicy for Admin {
    fn can_authenticate(&self) -> bool {
        self.status == AdminStatus::Active && !self.is_deleted()
    }
}

pub fn require_super_admin(actor: &Admin) -> Result<()> {
    if !actor.is_super_admin() {
        return Err(AuthError::forbidden("Super admin permission required"));
    }
    Ok(())
}

/// A second super admin cannot be created while the first one exists.
pub fn authorize_create_role(requested: AdminRole, first_super_admin_exists: bool) -> Result<()> {
    if requested == AdminRole::SuperAdmin && first_super_admin_exists {
        return Err(AuthError::forbidden(
            "Cannot create another super admin while first super admin exists",
        ));
    }
    Ok(())
}

/// Who may edit the target at all.
///
/// Only the first super admin edits its own record; other admins are edited
/// by themselves or by a super admin.
pub fn authorize_update_target(actor: &Admin, target: &Admin, target_is_first: bool) -> Result<()> {
    let is_self = actor.id == target.id;

    if target_is_first && !is_self {
        return Err(AuthError::forbidden("Cannot update first super admin"));
    }
    if !is_self && !actor.is_super_admin() {
        return Err(AuthError::forbidden("Super admin permission required"));
    }
    Ok(())
}

/// Role and status changes.
///
/// The first super admin is immutable, only super admins may change these
/// fields, and nobody changes their own.
pub fn authorize_privilege_change(
    actor: &Admin,
    target: &Admin,
    target_is_first: bool,
    update: &ValidAdminUpdate,
) -> Result<()> {
    if update.role.is_some() {
        check_privilege_field(actor, target, target_is_first, "role")?;
    }
    if update.status.is_some() {
        check_privilege_field(actor, target, target_is_first, "status")?;
    }
    Ok(())
}

fn check_privilege_field(actor: &Admin, target: &Admin, target_is_first: bool, field: &str) -> Result<()> {
    if target_is_first {
        return Err(AuthError::Forbidden(format!(
            "First super admin {} cannot be changed",
            field
        )));
    }
    if !actor.is_super_admin() {
        return Err(AuthError::Forbidden(format!("Cannot update {}", field)));
    }
    if actor.id == target.id {
        return Err(AuthError::Forbidden(format!("Cannot change your own {}", field)));
    }
    Ok(())
}

/// Checks that need only the actor and the requested id.
pub fn authorize_delete(actor: &Admin, target_id: i64) -> Result<()> {
    require_super_admin(actor)?;
    if actor.id == target_id {
        return Err(AuthError::forbidden("You cannot delete yourself"));
    }
    Ok(())
}

pub fn authorize_delete_target(target_is_first: bool) -> Result<()> {
    if target_is_first {
        return Err(AuthError::forbidden("Cannot delete first super admin"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lifecycle;
    use chrono::Utc;

    fn admin(id: i64, role: AdminRole, status: AdminStatus) -> Admin {
        let now = Utc::now();
        Admin {
            id,
            email: format!("admin{}@example.com", id),
            name: format!("Admin {}", id),
            password_hash: String::new(),
            role,
            status,
            last_login: None,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        }
    }

    fn role_change(role: AdminRole) -> ValidAdminUpdate {
        ValidAdminUpdate {
            role: Some(role),
            ..Default::default()
        }
    }

    fn forbidden_message(result: Result<()>) -> String {
        match result {
            Err(AuthError::Forbidden(msg)) => msg,
            other => panic!("expected forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_status_gates() {
        let now = Utc::now();
        let mut user = User {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            status: UserStatus::Passive,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        assert!(user.can_authenticate());
        user.status = UserStatus::Banned;
        assert!(!user.can_authenticate());
        assert!(!user.can_act());

        let mut passive = admin(2, AdminRole::Admin, AdminStatus::Passive);
        assert!(!passive.can_authenticate());
        passive.status = AdminStatus::Active;
        assert!(passive.can_act());
        passive.lifecycle = Lifecycle::Deleted { at: now };
        assert!(!passive.can_act());
    }

    #[test]
    fn test_create_requires_super_admin() {
        let editor = admin(2, AdminRole::Editor, AdminStatus::Active);
        assert_eq!(
            forbidden_message(require_super_admin(&editor)),
            "Super admin permission required"
        );
        assert!(require_super_admin(&admin(1, AdminRole::SuperAdmin, AdminStatus::Active)).is_ok());
    }

    #[test]
    fn test_second_super_admin_blocked() {
        assert!(authorize_create_role(AdminRole::SuperAdmin, false).is_ok());
        assert!(authorize_create_role(AdminRole::Admin, true).is_ok());
        assert!(authorize_create_role(AdminRole::SuperAdmin, true).is_err());
    }

    #[test]
    fn test_first_super_admin_only_edits_itself() {
        let root = admin(1, AdminRole::SuperAdmin, AdminStatus::Active);
        let other_super = admin(3, AdminRole::SuperAdmin, AdminStatus::Active);

        assert!(authorize_update_target(&root, &root, true).is_ok());
        assert_eq!(
            forbidden_message(authorize_update_target(&other_super, &root, true)),
            "Cannot update first super admin"
        );
    }

    #[test]
    fn test_non_super_admin_only_edits_itself() {
        let editor = admin(2, AdminRole::Editor, AdminStatus::Active);
        let other = admin(4, AdminRole::Admin, AdminStatus::Active);

        assert!(authorize_update_target(&editor, &editor, false).is_ok());
        assert!(authorize_update_target(&editor, &other, false).is_err());
    }

    #[test]
    fn test_first_super_admin_privileges_immutable() {
        let root = admin(1, AdminRole::SuperAdmin, AdminStatus::Active);
        let update = role_change(AdminRole::Editor);

        assert_eq!(
            forbidden_message(authorize_privilege_change(&root, &root, true, &update)),
            "First super admin role cannot be changed"
        );

        let status_update = ValidAdminUpdate {
            status: Some(AdminStatus::Passive),
            ..Default::default()
        };
        assert_eq!(
            forbidden_message(authorize_privilege_change(&root, &root, true, &status_update)),
            "First super admin status cannot be changed"
        );
    }

    #[test]
    fn test_self_privilege_change_always_rejected() {
        let second_super = admin(3, AdminRole::SuperAdmin, AdminStatus::Active);
        let editor = admin(2, AdminRole::Editor, AdminStatus::Active);

        assert!(authorize_privilege_change(&second_super, &second_super, false, &role_change(AdminRole::Admin)).is_err());
        assert!(authorize_privilege_change(&editor, &editor, false, &role_change(AdminRole::SuperAdmin)).is_err());
    }

    #[test]
    fn test_super_admin_changes_others() {
        let root = admin(1, AdminRole::SuperAdmin, AdminStatus::Active);
        let editor = admin(2, AdminRole::Editor, AdminStatus::Active);
        let update = ValidAdminUpdate {
            role: Some(AdminRole::Admin),
            status: Some(AdminStatus::Passive),
            ..Default::default()
        };

        assert!(authorize_privilege_change(&root, &editor, false, &update).is_ok());
        assert!(authorize_privilege_change(&editor, &root, true, &update).is_err());
    }

    #[test]
    fn test_profile_only_update_skips_privilege_rules() {
        let root = admin(1, AdminRole::SuperAdmin, AdminStatus::Active);
        let update = ValidAdminUpdate {
            name: Some("Root".into()),
            ..Default::default()
        };
        assert!(authorize_privilege_change(&root, &root, true, &update).is_ok());
    }

    #[test]
    fn test_delete_rules() {
        let root = admin(1, AdminRole::SuperAdmin, AdminStatus::Active);
        let editor = admin(2, AdminRole::Editor, AdminStatus::Active);

        assert!(authorize_delete(&root, 2).is_ok());
        assert_eq!(forbidden_message(authorize_delete(&root, 1)), "You cannot delete yourself");
        assert_eq!(
            forbidden_message(authorize_delete(&editor, 1)),
            "Super admin permission required"
        );
        assert!(authorize_delete_target(true).is_err());
        assert!(authorize_delete_target(false).is_ok());
    }
}
