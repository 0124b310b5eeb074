//! Resource addressing shared by files and folders.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access::AccessLevel;

/// Kind of item a share or access check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A file resource.
    File,
    /// A folder resource.
    Folder,
}

impl ResourceType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed pointer to a file or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// File or folder.
    pub resource_type: ResourceType,
    /// Item identifier.
    pub id: Uuid,
}

impl ResourceRef {
    /// Point at a file.
    pub fn file(id: Uuid) -> Self {
        Self {
            resource_type: ResourceType::File,
            id,
        }
    }

    /// Point at a folder.
    pub fn folder(id: Uuid) -> Self {
        Self {
            resource_type: ResourceType::Folder,
            id,
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// Anything the access evaluator can decide on.
pub trait AccessControlled {
    /// The item's address.
    fn resource(&self) -> ResourceRef;
    /// The owning user.
    fn owner_id(&self) -> Uuid;
    /// The item's visibility.
    fn access_level(&self) -> AccessLevel;
}
