//! Role enforcement for user administration.
//!
//! Roles never widen item access. The only path by which an administrator
//! acts on another user's data is [`RoleEnforcer::require_admin_override`],
//! which is checked separately and written to the `audit` log target.

use tracing::info;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::user::{Principal, UserRole};

/// Enforces role requirements for administrative operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleEnforcer;

impl RoleEnforcer {
    /// Create a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Require the actor to hold at least `minimum`.
    pub fn require_minimum_role(&self, actual: UserRole, minimum: UserRole) -> AppResult<()> {
        if actual.has_at_least(&minimum) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{actual}' is insufficient; minimum required: '{minimum}'"
            )))
        }
    }

    /// Require ADMIN or SUPER_ADMIN.
    pub fn require_admin(&self, actual: UserRole) -> AppResult<()> {
        self.require_minimum_role(actual, UserRole::Admin)
    }

    /// Whether an actor with `actor` may administer an account holding
    /// `target`. ADMIN manages USER; SUPER_ADMIN manages ADMIN and USER.
    pub fn can_manage(&self, actor: UserRole, target: UserRole) -> bool {
        actor.is_admin_or_above() && actor.outranks(&target)
    }

    /// Require the actor to be allowed to assign `new_role` to an account
    /// currently holding `current_role`.
    ///
    /// SUPER_ADMIN is never assignable through the API.
    pub fn require_role_assignment(
        &self,
        actor: UserRole,
        current_role: UserRole,
        new_role: UserRole,
    ) -> AppResult<()> {
        if new_role == UserRole::SuperAdmin {
            return Err(AppError::forbidden("SUPER_ADMIN cannot be assigned"));
        }
        if !self.can_manage(actor, current_role) || !self.can_manage(actor, new_role) {
            return Err(AppError::forbidden(format!(
                "Role '{actor}' cannot change a '{current_role}' account to '{new_role}'"
            )));
        }
        Ok(())
    }

    /// Authorize an administrator to act on data owned by another user.
    ///
    /// Succeeds only when the actor outranks the target account. Every
    /// granted override is logged to the `audit` target.
    pub fn require_admin_override(
        &self,
        actor: &Principal,
        target_user: Uuid,
        target_role: UserRole,
        action: &str,
    ) -> AppResult<()> {
        if actor.id == target_user {
            return Ok(());
        }
        if !self.can_manage(actor.role, target_role) {
            return Err(AppError::forbidden(format!(
                "Role '{}' cannot {action} a '{target_role}' account",
                actor.role
            )));
        }
        info!(
            target: "audit",
            actor_id = %actor.id,
            actor_role = %actor.role,
            target_user = %target_user,
            target_role = %target_role,
            action,
            "Administrative override granted"
        );
        Ok(())
    }
}
