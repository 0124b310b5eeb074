//! Folder CRUD operations with access enforcement.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{FileRepository, FolderRepository};
use drivehub_entity::file::File;
use drivehub_entity::folder::{CreateFolder, Folder};
use drivehub_entity::naming::normalize_name;
use drivehub_entity::permission::{AccessLevel, SharePermission};
use drivehub_storage::ReleaseQueue;

use super::tree::FolderTree;
use crate::context::RequestContext;
use crate::permission::PermissionService;

/// Direct contents of a folder (or of a user's root).
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderContents {
    /// Files, ordered by name.
    pub files: Vec<File>,
    /// Folders, ordered by name.
    pub folders: Vec<Folder>,
}

impl FolderContents {
    /// Sort both groups by name (case-insensitive), then by ID.
    pub fn sorted(mut self) -> Self {
        self.folders
            .sort_by(|a, b| by_name(&a.name, a.id, &b.name, b.id));
        self.files
            .sort_by(|a, b| by_name(&a.name, a.id, &b.name, b.id));
        self
    }

    /// Whether there is nothing in the folder.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }
}

fn by_name(a_name: &str, a_id: Uuid, b_name: &str, b_id: Uuid) -> Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_id.cmp(&b_id))
}

/// Manages the folder hierarchy.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Database pool.
    db: DatabasePool,
    /// Background blob release.
    releases: ReleaseQueue,
    /// Folder repository.
    folder_repo: FolderRepository,
    /// File repository.
    file_repo: FileRepository,
    /// Item authorization.
    permissions: PermissionService,
    /// Tree traversal.
    tree: FolderTree,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(db: DatabasePool, releases: ReleaseQueue, max_path_depth: usize) -> Self {
        Self {
            db,
            releases,
            folder_repo: FolderRepository::new(),
            file_repo: FileRepository::new(),
            permissions: PermissionService::new(),
            tree: FolderTree::new(max_path_depth),
        }
    }

    /// Creates a new PRIVATE folder under `parent_id` (or at the root).
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let name = normalize_name(name)?;

        let mut tx = self.db.begin_write().await?;
        self.permissions
            .parent_for_new_item(tx.conn(), ctx.user_id(), parent_id)
            .await?;
        let folder = self
            .folder_repo
            .create(
                tx.conn(),
                &CreateFolder {
                    name,
                    parent_id,
                    owner_id: ctx.user_id(),
                    access_level: AccessLevel::Private,
                },
            )
            .await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder created"
        );

        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        let mut conn = self.db.acquire().await?;
        self.permissions
            .folder(&mut conn, Some(ctx.user_id()), folder_id, SharePermission::View)
            .await
    }

    /// Lists the direct contents of a folder, or the caller's own root
    /// items when `folder_id` is `None`.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: Option<Uuid>,
    ) -> AppResult<FolderContents> {
        let mut conn = self.db.acquire().await?;
        let principal = ctx.user_id();

        let Some(folder_id) = folder_id else {
            let folders = self.folder_repo.find_roots(&mut conn, principal).await?;
            let files = self.file_repo.find_roots(&mut conn, principal).await?;
            return Ok(FolderContents { files, folders }.sorted());
        };

        let folder = self
            .permissions
            .folder(&mut conn, Some(principal), folder_id, SharePermission::View)
            .await?;

        let resolver = self.permissions.resolver();
        let grants = resolver.grants_for(&mut conn, Some(principal)).await?;
        let folders = self
            .folder_repo
            .find_children(&mut conn, folder.id)
            .await?
            .into_iter()
            .filter(|f| grants.can_access(f, SharePermission::View))
            .collect();
        let files = self
            .file_repo
            .find_children(&mut conn, folder.id)
            .await?
            .into_iter()
            .filter(|f| grants.can_access(f, SharePermission::View))
            .collect();

        Ok(FolderContents { files, folders }.sorted())
    }

    /// Returns the chain of folders from the root down to `folder_id`.
    pub async fn resolve_path(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Vec<Folder>> {
        let mut conn = self.db.acquire().await?;
        let folder = self
            .permissions
            .folder(&mut conn, Some(ctx.user_id()), folder_id, SharePermission::View)
            .await?;
        self.tree.path_to(&mut conn, folder).await
    }

    /// Renames a folder.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<Folder> {
        let name = normalize_name(new_name)?;

        let mut tx = self.db.begin_write().await?;
        self.permissions
            .folder(tx.conn(), Some(ctx.user_id()), folder_id, SharePermission::Edit)
            .await?;
        let folder = self
            .folder_repo
            .rename(tx.conn(), folder_id, &name)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        tx.commit().await?;

        info!(user_id = %ctx.user_id(), folder_id = %folder_id, "Folder renamed");
        Ok(folder)
    }

    /// Moves a folder under `new_parent_id` (or to its owner's root).
    ///
    /// The cycle check and the write run in one transaction.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let mut tx = self.db.begin_write().await?;
        let folder = self
            .permissions
            .folder(tx.conn(), Some(ctx.user_id()), folder_id, SharePermission::Manage)
            .await?;

        if let Some(target_id) = new_parent_id {
            if target_id == folder_id
                || self
                    .tree
                    .is_self_or_descendant(tx.conn(), folder_id, target_id)
                    .await?
            {
                return Err(AppError::cycle_detected(
                    "A folder cannot be moved into itself or one of its descendants",
                ));
            }
        }
        self.permissions
            .move_target(tx.conn(), ctx.user_id(), folder.owner_id, new_parent_id)
            .await?;

        let moved = self
            .folder_repo
            .set_parent(tx.conn(), folder_id, new_parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            folder_id = %folder_id,
            from = ?folder.parent_id,
            to = ?new_parent_id,
            "Folder moved"
        );
        Ok(moved)
    }

    /// Changes a folder's access level.
    pub async fn set_folder_access(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        level: AccessLevel,
    ) -> AppResult<Folder> {
        let mut tx = self.db.begin_write().await?;
        self.permissions
            .folder(tx.conn(), Some(ctx.user_id()), folder_id, SharePermission::Manage)
            .await?;
        let folder = self
            .folder_repo
            .set_access_level(tx.conn(), folder_id, level)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            folder_id = %folder_id,
            access_level = %level,
            "Folder access level changed"
        );
        Ok(folder)
    }

    /// Deletes a folder and everything below it.
    ///
    /// The whole subtree is removed in one transaction; blobs are released
    /// in the background after commit.
    pub async fn delete_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin_write().await?;
        self.permissions
            .folder(tx.conn(), Some(ctx.user_id()), folder_id, SharePermission::Manage)
            .await?;
        let subtree = self.tree.collect(tx.conn(), folder_id).await?;
        let report = self
            .tree
            .purge(tx.conn(), &subtree.folder_ids, &subtree.files)
            .await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            folder_id = %folder_id,
            folders = report.folders,
            files = report.files,
            shares = report.shares,
            bytes = report.bytes,
            "Folder deleted"
        );

        self.releases.enqueue(report.blob_refs).await;
        Ok(())
    }

    /// Items other users have shared with the caller.
    pub async fn shared_with_me(&self, ctx: &RequestContext) -> AppResult<FolderContents> {
        let mut conn = self.db.acquire().await?;
        let principal = ctx.user_id();
        let grants = self
            .permissions
            .resolver()
            .grants_for(&mut conn, Some(principal))
            .await?;
        if grants.is_empty() {
            return Ok(FolderContents::default());
        }

        let folders = self
            .folder_repo
            .find_shared_with(&mut conn, principal)
            .await?
            .into_iter()
            .filter(|f| f.owner_id != principal && grants.can_access(f, SharePermission::View))
            .collect();
        let files = self
            .file_repo
            .find_shared_with(&mut conn, principal)
            .await?
            .into_iter()
            .filter(|f| f.owner_id != principal && grants.can_access(f, SharePermission::View))
            .collect();

        Ok(FolderContents { files, folders }.sorted())
    }
}
