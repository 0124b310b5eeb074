//! Share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::permission::{ResourceRef, ResourceType, SharePermission};

/// An explicit grant of a permission on one item to one user.
///
/// Unique per `(resource_type, resource_id, grantee_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// Type of resource being shared.
    pub resource_type: ResourceType,
    /// ID of the shared resource.
    pub resource_id: Uuid,
    /// User receiving the grant.
    pub grantee_id: Uuid,
    /// Permission level granted.
    pub permission: SharePermission,
    /// User who created the share.
    pub created_by: Uuid,
    /// When the share was created or last replaced.
    pub created_at: DateTime<Utc>,
}

impl Share {
    /// The shared item's address.
    pub fn resource(&self) -> ResourceRef {
        ResourceRef {
            resource_type: self.resource_type,
            id: self.resource_id,
        }
    }
}

/// Data required to create or replace a share.
#[derive(Debug, Clone)]
pub struct CreateShare {
    /// The item being shared.
    pub resource: ResourceRef,
    /// User receiving the grant.
    pub grantee_id: Uuid,
    /// Permission level.
    pub permission: SharePermission,
    /// User creating the share.
    pub created_by: Uuid,
}
