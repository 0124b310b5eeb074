//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use drivehub_core::error::AppError;
use drivehub_core::types::pagination::DEFAULT_PAGE_SIZE;
use drivehub_core::types::{PageRequest, SortDirection};
use drivehub_entity::permission::{AccessLevel, ResourceRef, SharePermission};
use drivehub_entity::user::{UpdateUser, UserRole};
use drivehub_service::file::{FileFilter, FileSortField};

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_permission() -> SharePermission {
    SharePermission::View
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder ID; absent for the root.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Rename request, for files and folders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Move request, for files and folders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Target folder ID; `null` moves to the owner's root.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Access level change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccessLevelRequest {
    /// New level.
    pub access_level: AccessLevel,
}

/// `GET /files/folders` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderQuery {
    /// Folder to list; absent for the caller's root.
    pub folder_id: Option<Uuid>,
}

/// `GET /files/list` query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Name substring.
    pub search: Option<String>,
    /// MIME type prefix.
    pub mime_type: Option<String>,
    /// Sort field.
    pub sort_by: Option<FileSortField>,
    /// Sort direction.
    pub sort_order: Option<SortDirection>,
}

impl ListFilesQuery {
    /// Splits into the service filter and the page.
    pub fn into_parts(self) -> (FileFilter, PageRequest) {
        let defaults = FileFilter::default();
        let filter = FileFilter {
            search: self.search,
            mime_type: self.mime_type,
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
        };
        (filter, PageRequest::new(self.page, self.limit))
    }
}

/// Download query.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DownloadQuery {
    /// Render in the browser instead of saving.
    #[serde(default)]
    pub inline: bool,
}

/// Share request. Exactly one of `fileId` and `folderId` must be set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// File to share.
    pub file_id: Option<Uuid>,
    /// Folder to share.
    pub folder_id: Option<Uuid>,
    /// Grantee's email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Permission to grant.
    #[serde(default = "default_permission")]
    pub permission: SharePermission,
}

impl ShareRequest {
    /// The item being shared.
    pub fn resource(&self) -> Result<ResourceRef, AppError> {
        match (self.file_id, self.folder_id) {
            (Some(id), None) => Ok(ResourceRef::file(id)),
            (None, Some(id)) => Ok(ResourceRef::folder(id)),
            _ => Err(AppError::validation(
                "Exactly one of fileId and folderId is required",
            )),
        }
    }
}

/// `GET /search` query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search text.
    #[serde(default)]
    pub query: String,
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// `GET /users/search` query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSearchQuery {
    /// Email or name substring.
    pub search: Option<String>,
    /// Exact role.
    pub role: Option<UserRole>,
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// Role change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    /// Target user.
    pub user_id: Uuid,
    /// New role.
    pub role: UserRole,
}

/// Profile/quota update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// Quota in bytes.
    #[validate(range(min = 0, message = "Storage quota must not be negative"))]
    pub storage_quota: Option<i64>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            storage_quota: req.storage_quota,
        }
    }
}
