use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::auth::roles::Role;

/// Who is asking, resolved once per request.
///
/// Construct through [`PrincipalContext::anonymous`], [`PrincipalContext::unprivileged`]
/// or [`PrincipalContext::from_flags`] so the derived flags stay consistent:
/// `is_authenticated` tracks `user_id`, `is_staff` covers admin and manager,
/// and `is_manager` covers admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalContext {
    user_id: Option<Uuid>,
    is_authenticated: bool,
    is_admin: bool,
    is_staff: bool,
    is_manager: bool,
    is_dev_environment: bool,
}

/// Raw role membership before the staff/manager roll-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub admin: bool,
    pub staff: bool,
    pub manager: bool,
}

impl RoleFlags {
    pub fn from_roles(roles: &HashSet<Role>) -> Self {
        Self {
            admin: roles.contains(&Role::Admin),
            staff: roles.contains(&Role::Staff),
            manager: roles.contains(&Role::Manager),
        }
    }
}

impl PrincipalContext {
    /// No session: nobody owns anything, only public rows are visible
    pub fn anonymous(is_dev_environment: bool) -> Self {
        Self {
            user_id: None,
            is_authenticated: false,
            is_admin: false,
            is_staff: false,
            is_manager: false,
            is_dev_environment,
        }
    }

    /// Fail-closed context used when resolution itself went wrong.
    /// The dev override is off here too, so a broken lookup never widens access.
    pub fn unprivileged() -> Self {
        Self::anonymous(false)
    }

    pub fn from_flags(user_id: Uuid, flags: RoleFlags, is_dev_environment: bool) -> Self {
        Self {
            user_id: Some(user_id),
            is_authenticated: true,
            is_admin: flags.admin,
            is_staff: flags.staff || flags.admin || flags.manager,
            is_manager: flags.manager || flags.admin,
            is_dev_environment,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_manager(&self) -> bool {
        self.is_manager
    }

    pub fn is_dev_environment(&self) -> bool {
        self.is_dev_environment
    }
}
