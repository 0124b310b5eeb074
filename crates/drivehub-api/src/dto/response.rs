//! Response DTOs.
//!
//! Most handlers serialize entities directly; these cover the few shapes
//! that are not an entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivehub_entity::file::File;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database reachability.
    pub database: bool,
    /// Blob store reachability.
    pub storage: bool,
}

/// What an anonymous holder of a public token may learn about a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFileInfo {
    /// File ID.
    pub id: Uuid,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl From<File> for PublicFileInfo {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}
