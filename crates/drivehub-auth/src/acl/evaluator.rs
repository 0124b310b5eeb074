//! The access evaluator.
//!
//! A pure decision over one item, one principal, and the principal's grant
//! on that item (if any). Rules are applied in order:
//!
//! 1. The owner always holds `MANAGE`.
//! 2. A `PUBLIC` item is viewable by anyone, including anonymous callers.
//! 3. A `SHARED` item is reachable at the level of the caller's grant.
//! 4. A `PRIVATE` item is reachable by its owner only.
//!
//! Roles never enter the decision. Administrative actions go through
//! [`RoleEnforcer`](crate::rbac::RoleEnforcer) instead.

use uuid::Uuid;

use drivehub_entity::permission::{AccessControlled, AccessLevel, SharePermission};

/// Decide whether `principal` may perform an action requiring `required`
/// on `item`.
///
/// `grant` is the principal's direct share on this exact item; shares on
/// ancestor folders are not consulted.
pub fn can_access<T: AccessControlled + ?Sized>(
    principal: Option<Uuid>,
    item: &T,
    grant: Option<SharePermission>,
    required: SharePermission,
) -> bool {
    effective_permission(principal, item, grant)
        .is_some_and(|held| held.has_at_least(&required))
}

/// The strongest permission `principal` holds on `item`, if any.
pub fn effective_permission<T: AccessControlled + ?Sized>(
    principal: Option<Uuid>,
    item: &T,
    grant: Option<SharePermission>,
) -> Option<SharePermission> {
    if principal.is_some_and(|id| id == item.owner_id()) {
        return Some(SharePermission::Manage);
    }

    match item.access_level() {
        AccessLevel::Public => Some(SharePermission::View),
        AccessLevel::Shared => principal.and(grant),
        AccessLevel::Private => None,
    }
}
