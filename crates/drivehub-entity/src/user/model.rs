//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use crate::storage::StorageQuota;

/// A user known to the DriveHub directory.
///
/// Credentials live with the identity service; this row only carries what
/// the drive itself needs: a display identity, a role, and quota accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier (the token's `sub`).
    pub id: Uuid,
    /// Unique email address.
    pub email: String,
    /// Human-readable display name.
    pub name: String,
    /// User role (RBAC).
    pub role: UserRole,
    /// Quota in bytes.
    pub storage_quota: i64,
    /// Bytes used by the user's files.
    pub storage_used: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin_or_above()
    }

    /// Snapshot of the user's quota accounting.
    pub fn quota(&self) -> StorageQuota {
        StorageQuota::new(self.storage_quota, self.storage_used)
    }
}

/// Data required to register a user in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Identifier assigned by the identity service.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Assigned role.
    pub role: UserRole,
    /// Initial quota in bytes.
    pub storage_quota: i64,
}

/// Profile fields that may be changed after registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    /// New display name.
    pub name: Option<String>,
    /// New quota in bytes.
    pub storage_quota: Option<i64>,
}

impl UpdateUser {
    /// Whether the update touches any field only administrators may change.
    pub fn touches_admin_fields(&self) -> bool {
        self.storage_quota.is_some()
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.storage_quota.is_none()
    }
}
