//! Loading items on behalf of a principal.
//!
//! An item the principal cannot even view is reported as `NotFound`, so its
//! existence does not leak. An item that is visible but lacks the required
//! permission is `Forbidden`.

use sqlx::SqliteConnection;
use uuid::Uuid;

use drivehub_auth::acl::AccessResolver;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_database::repositories::{FileRepository, FolderRepository};
use drivehub_entity::file::File;
use drivehub_entity::folder::Folder;
use drivehub_entity::permission::{AccessControlled, ResourceRef, ResourceType, SharePermission};

/// Loads folders and files and checks the caller's permission on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionService {
    resolver: AccessResolver,
    folders: FolderRepository,
    files: FileRepository,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying access resolver.
    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    /// Load a folder the principal holds `required` on.
    pub async fn folder(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        id: Uuid,
        required: SharePermission,
    ) -> AppResult<Folder> {
        let folder = self
            .folders
            .find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        self.authorize(conn, principal, folder, required, "Folder not found")
            .await
    }

    /// Load a file the principal holds `required` on.
    pub async fn file(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        id: Uuid,
        required: SharePermission,
    ) -> AppResult<File> {
        let file = self
            .files
            .find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.authorize(conn, principal, file, required, "File not found")
            .await
    }

    /// Check `required` on a file or folder and return its owner.
    pub async fn resource_owner(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        resource: ResourceRef,
        required: SharePermission,
    ) -> AppResult<Uuid> {
        match resource.resource_type {
            ResourceType::File => Ok(self.file(conn, principal, resource.id, required).await?.owner_id),
            ResourceType::Folder => Ok(self
                .folder(conn, principal, resource.id, required)
                .await?
                .owner_id),
        }
    }

    /// Resolve the parent for a new item.
    ///
    /// New items always belong to the owner of their parent, so the parent
    /// must be owned by the principal.
    pub async fn parent_for_new_item(
        &self,
        conn: &mut SqliteConnection,
        principal: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let parent = self
            .folder(conn, Some(principal), parent_id, SharePermission::View)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::NotFound => AppError::not_found("Parent folder not found"),
                _ => e,
            })?;
        if parent.owner_id != principal {
            return Err(AppError::forbidden("Items can only be created in folders you own"));
        }
        Ok(Some(parent))
    }

    /// Resolve the destination of a move for an item owned by `owner_id`.
    ///
    /// `None` is the owner's root, which is always a valid destination.
    pub async fn move_target(
        &self,
        conn: &mut SqliteConnection,
        principal: Uuid,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let target = self
            .folder(conn, Some(principal), parent_id, SharePermission::View)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::NotFound => AppError::not_found("Target folder not found"),
                _ => e,
            })?;
        if target.owner_id != owner_id {
            return Err(AppError::forbidden("Target folder must belong to the item's owner"));
        }
        Ok(Some(target))
    }

    async fn authorize<T: AccessControlled>(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        item: T,
        required: SharePermission,
        not_found: &'static str,
    ) -> AppResult<T> {
        let held = self.resolver.permission_on(conn, principal, &item).await?;
        match held {
            None => Err(AppError::not_found(not_found)),
            Some(p) if p.has_at_least(&required) => Ok(item),
            Some(_) => Err(AppError::forbidden(format!(
                "{required} permission required on {}",
                item.resource()
            ))),
        }
    }
}
