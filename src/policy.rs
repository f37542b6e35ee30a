//! Authorization policy: pure predicates over the resolved caller.
//!
//! Every state-mutating operation calls one of these before touching
//! storage, so a failed check can never leave a partial write behind. The
//! return path is the deliberate exception (no check is applied there).

use crate::{
    error::{AppError, AppResult},
    models::user::Principal,
};

/// Require that a principal was resolved at all.
pub fn require_authenticated(principal: Option<&Principal>) -> AppResult<&Principal> {
    principal.ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
}

/// Require admin-level access. Owners pass: every owner capability is a
/// superset of admin capability.
pub fn require_admin(principal: &Principal) -> AppResult<()> {
    if principal.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Authorization("Admin access required".to_string()))
    }
}

/// Require owner access.
pub fn require_owner(principal: &Principal) -> AppResult<()> {
    if principal.role.is_owner() {
        Ok(())
    } else {
        Err(AppError::Authorization("Owner access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use uuid::Uuid;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            role,
        }
    }

    #[test]
    fn unauthenticated_is_rejected() {
        assert!(matches!(
            require_authenticated(None),
            Err(AppError::Authentication(_))
        ));
        let p = principal(Role::User);
        assert!(require_authenticated(Some(&p)).is_ok());
    }

    #[test]
    fn admin_gate_accepts_admin_and_owner() {
        assert!(matches!(
            require_admin(&principal(Role::User)),
            Err(AppError::Authorization(_))
        ));
        assert!(require_admin(&principal(Role::Admin)).is_ok());
        assert!(require_admin(&principal(Role::Owner)).is_ok());
    }

    #[test]
    fn owner_gate_accepts_owner_only() {
        assert!(matches!(
            require_owner(&principal(Role::User)),
            Err(AppError::Authorization(_))
        ));
        assert!(matches!(
            require_owner(&principal(Role::Admin)),
            Err(AppError::Authorization(_))
        ));
        assert!(require_owner(&principal(Role::Owner)).is_ok());
    }
}
