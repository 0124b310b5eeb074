//! File metadata operations with access enforcement.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::types::{PageRequest, PageResponse, SortDirection};
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{FileRepository, ShareRepository, UserRepository};
use drivehub_entity::file::File;
use drivehub_entity::naming::normalize_name;
use drivehub_entity::permission::{AccessLevel, ResourceRef, SharePermission};
use drivehub_storage::ReleaseQueue;

use crate::context::RequestContext;
use crate::permission::PermissionService;

/// Field to order a file listing by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileSortField {
    /// Name, case-insensitive.
    Name,
    /// Size in bytes.
    Size,
    /// Creation time.
    #[default]
    CreatedAt,
    /// Last modification time.
    UpdatedAt,
}

/// Filters for listing the caller's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// MIME type prefix, e.g. `image/`.
    pub mime_type: Option<String>,
    /// Sort field.
    pub sort_by: FileSortField,
    /// Sort direction.
    pub sort_order: SortDirection,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            search: None,
            mime_type: None,
            sort_by: FileSortField::CreatedAt,
            sort_order: SortDirection::Desc,
        }
    }
}

impl FileFilter {
    fn matches(&self, file: &File) -> bool {
        let name_ok = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                file.name.to_lowercase().contains(&term.to_lowercase())
            }
            _ => true,
        };
        let mime_ok = match self.mime_type.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() => file
                .mime_type
                .to_lowercase()
                .starts_with(&prefix.to_lowercase()),
            _ => true,
        };
        name_ok && mime_ok
    }

    fn compare(&self, a: &File, b: &File) -> Ordering {
        let primary = match self.sort_by {
            FileSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            FileSortField::Size => a.size_bytes.cmp(&b.size_bytes),
            FileSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            FileSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        self.sort_order
            .apply(primary)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Manages file metadata.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Database pool.
    db: DatabasePool,
    /// Background blob release.
    releases: ReleaseQueue,
    /// File repository.
    file_repo: FileRepository,
    /// Share repository.
    share_repo: ShareRepository,
    /// User repository.
    user_repo: UserRepository,
    /// Item authorization.
    permissions: PermissionService,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(db: DatabasePool, releases: ReleaseQueue) -> Self {
        Self {
            db,
            releases,
            file_repo: FileRepository::new(),
            share_repo: ShareRepository::new(),
            user_repo: UserRepository::new(),
            permissions: PermissionService::new(),
        }
    }

    /// Gets file metadata by ID.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        let mut conn = self.db.acquire().await?;
        self.permissions
            .file(&mut conn, Some(ctx.user_id()), file_id, SharePermission::View)
            .await
    }

    /// Lists the caller's own files with filtering, sorting, and paging.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        filter: &FileFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let mut conn = self.db.acquire().await?;
        let mut files: Vec<File> = self
            .file_repo
            .find_by_owner(&mut conn, ctx.user_id())
            .await?
            .into_iter()
            .filter(|f| filter.matches(f))
            .collect();
        files.sort_by(|a, b| filter.compare(a, b));

        let total = files.len() as u64;
        Ok(PageResponse::new(page.slice(files), &page, total))
    }

    /// Renames a file.
    pub async fn rename_file(&self, ctx: &RequestContext, file_id: Uuid, new_name: &str) -> AppResult<File> {
        let name = normalize_name(new_name)?;

        let mut tx = self.db.begin_write().await?;
        self.permissions
            .file(tx.conn(), Some(ctx.user_id()), file_id, SharePermission::Edit)
            .await?;
        let file = self
            .file_repo
            .rename(tx.conn(), file_id, &name)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        tx.commit().await?;

        info!(user_id = %ctx.user_id(), file_id = %file_id, "File renamed");
        Ok(file)
    }

    /// Moves a file into another folder owned by the file's owner.
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<File> {
        let mut tx = self.db.begin_write().await?;
        let file = self
            .permissions
            .file(tx.conn(), Some(ctx.user_id()), file_id, SharePermission::Manage)
            .await?;
        self.permissions
            .move_target(tx.conn(), ctx.user_id(), file.owner_id, new_parent_id)
            .await?;
        let moved = self
            .file_repo
            .set_parent(tx.conn(), file_id, new_parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            file_id = %file_id,
            from = ?file.parent_id,
            to = ?new_parent_id,
            "File moved"
        );
        Ok(moved)
    }

    /// Changes a file's access level.
    ///
    /// Leaving PUBLIC keeps the issued token; it only resolves again once
    /// the file is PUBLIC.
    pub async fn set_file_access(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        level: AccessLevel,
    ) -> AppResult<File> {
        let mut tx = self.db.begin_write().await?;
        self.permissions
            .file(tx.conn(), Some(ctx.user_id()), file_id, SharePermission::Manage)
            .await?;
        let file = self
            .file_repo
            .set_access_level(tx.conn(), file_id, level)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            file_id = %file_id,
            access_level = %level,
            "File access level changed"
        );
        Ok(file)
    }

    /// Deletes a file, its shares, and its quota usage.
    ///
    /// The blob is released in the background; a release failure never
    /// fails the delete.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin_write().await?;
        self.permissions
            .file(tx.conn(), Some(ctx.user_id()), file_id, SharePermission::Manage)
            .await?;
        let shares = self
            .share_repo
            .delete_for_resource(tx.conn(), ResourceRef::file(file_id))
            .await?;
        let file = self
            .file_repo
            .delete(tx.conn(), file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.user_repo
            .release_storage(tx.conn(), file.owner_id, file.size_bytes)
            .await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            file_id = %file_id,
            size_bytes = file.size_bytes,
            shares,
            "File deleted"
        );

        self.releases.enqueue([file.blob_ref]).await;
        Ok(())
    }
}
