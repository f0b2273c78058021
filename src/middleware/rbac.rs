// src/middleware/rbac.rs

use crate::{common::error::AppError, models::auth::User};

/// Slugs de permissão conhecidos.
pub mod permissions {
    pub const FAMILIES_READ: &str = "families.read";
    pub const STREET_READ: &str = "street.read";
    pub const DELIVERIES_READ: &str = "deliveries.read";
    pub const EQUIPMENT_READ: &str = "equipment.read";
    pub const REPORTS_READ: &str = "reports.read";
    pub const SETTINGS_READ: &str = "settings.read";
    pub const SETTINGS_WRITE: &str = "settings.write";
    pub const ELIGIBILITY_CHECK: &str = "eligibility.check";
    pub const VISITS_READ: &str = "visits.read";
    pub const VISITS_WRITE: &str = "visits.write";
    pub const USERS_MANAGE: &str = "users.manage";
}

/// Regra de autorização de uma rota protegida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// O usuário precisa da permissão (ou do curinga `*`).
    Permission(&'static str),
    /// Papéis com escrita: admin, voluntario, pastoral.
    WriterRole,
}

impl AuthPolicy {
    pub fn allows(self, user: &User) -> bool {
        match self {
            AuthPolicy::Permission(slug) => user.has_permission(slug),
            AuthPolicy::WriterRole => user.role.can_write(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Policy(AuthPolicy),
}

impl Access {
    pub const fn permission(slug: &'static str) -> Self {
        Access::Policy(AuthPolicy::Permission(slug))
    }

    pub const fn writer() -> Self {
        Access::Policy(AuthPolicy::WriterRole)
    }
}

pub fn authorize(policy: AuthPolicy, user: &User) -> Result<(), AppError> {
    if policy.allows(user) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{PermissionSet, Role};

    fn user(role: Role, permissions: PermissionSet) -> User {
        User {
            id: 1,
            name: "u".into(),
            email: "u@local".into(),
            password_hash: String::new(),
            role,
            permissions,
        }
    }

    #[test]
    fn permission_policy_uses_permission_set() {
        let reader = user(Role::Leitura, PermissionSet::explicit(&[permissions::FAMILIES_READ]));
        assert!(authorize(AuthPolicy::Permission(permissions::FAMILIES_READ), &reader).is_ok());
        assert!(matches!(
            authorize(AuthPolicy::Permission(permissions::USERS_MANAGE), &reader),
            Err(AppError::Forbidden)
        ));

        let admin = user(Role::Admin, PermissionSet::Wildcard);
        assert!(authorize(AuthPolicy::Permission(permissions::USERS_MANAGE), &admin).is_ok());
    }

    #[test]
    fn writer_policy_ignores_permissions() {
        let reader = user(Role::Leitura, PermissionSet::Wildcard);
        assert!(authorize(AuthPolicy::WriterRole, &reader).is_err());

        let pastoral = user(Role::Pastoral, PermissionSet::explicit(&[]));
        assert!(authorize(AuthPolicy::WriterRole, &pastoral).is_ok());
    }
}
