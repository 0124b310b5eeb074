//! File entity model.

use chrono::{DateTime, Utc};
use drivehub_core::traits::BlobRef;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::permission::{AccessControlled, AccessLevel, ResourceRef};

/// A file stored in DriveHub.
///
/// The content lives in the blob store behind `blob_ref`, which is never
/// serialized to clients.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file name (including extension).
    pub name: String,
    /// The folder containing this file (null for the owner's root).
    pub parent_id: Option<Uuid>,
    /// The file owner.
    pub owner_id: Uuid,
    /// MIME type of the file.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Visibility of the file.
    pub access_level: AccessLevel,
    /// Token of the currently issued public link, if any.
    pub public_token: Option<String>,
    /// Reference into the blob store.
    #[serde(skip)]
    pub blob_ref: BlobRef,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }

    /// Whether the public token, if any, currently resolves.
    pub fn is_publicly_reachable(&self) -> bool {
        self.public_token.is_some() && self.access_level == AccessLevel::Public
    }
}

impl AccessControlled for File {
    fn resource(&self) -> ResourceRef {
        ResourceRef::file(self.id)
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn access_level(&self) -> AccessLevel {
        self.access_level
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone)]
pub struct CreateFile {
    /// The file name, already normalized.
    pub name: String,
    /// The folder to place the file in.
    pub parent_id: Option<Uuid>,
    /// The file owner.
    pub owner_id: Uuid,
    /// MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Initial visibility.
    pub access_level: AccessLevel,
    /// Where the content was stored.
    pub blob_ref: BlobRef,
}
