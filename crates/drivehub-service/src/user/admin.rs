//! User administration: listing, role changes, profile edits, deletion.

use tracing::info;
use uuid::Uuid;

use drivehub_auth::rbac::RoleEnforcer;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::types::{PageRequest, PageResponse};
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{
    FileRepository, FolderRepository, ShareRepository, UserRepository,
};
use drivehub_entity::user::{UpdateUser, User, UserRole};
use drivehub_storage::ReleaseQueue;

use crate::context::RequestContext;
use crate::folder::FolderTree;

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    /// Database pool.
    db: DatabasePool,
    /// Background blob release.
    releases: ReleaseQueue,
    /// User repository.
    user_repo: UserRepository,
    /// Folder repository.
    folder_repo: FolderRepository,
    /// File repository.
    file_repo: FileRepository,
    /// Share repository.
    share_repo: ShareRepository,
    /// Role enforcement.
    rbac: RoleEnforcer,
    /// Bulk removal of owned items.
    tree: FolderTree,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(db: DatabasePool, releases: ReleaseQueue, max_path_depth: usize) -> Self {
        Self {
            db,
            releases,
            user_repo: UserRepository::new(),
            folder_repo: FolderRepository::new(),
            file_repo: FileRepository::new(),
            share_repo: ShareRepository::new(),
            rbac: RoleEnforcer::new(),
            tree: FolderTree::new(max_path_depth),
        }
    }

    /// Lists all users.
    pub async fn list_users(&self, ctx: &RequestContext, page: PageRequest) -> AppResult<PageResponse<User>> {
        self.rbac.require_admin(ctx.role())?;
        let mut conn = self.db.acquire().await?;
        self.user_repo.find_all(&mut conn, &page).await
    }

    /// Searches users by email/name substring and role.
    pub async fn search_users(
        &self,
        ctx: &RequestContext,
        search: Option<&str>,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.rbac.require_admin(ctx.role())?;
        let mut conn = self.db.acquire().await?;
        self.user_repo.search(&mut conn, search, role, &page).await
    }

    /// Gets a user by ID.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<User> {
        self.rbac.require_admin(ctx.role())?;
        let mut conn = self.db.acquire().await?;
        self.user_repo
            .find_by_id(&mut conn, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Changes a user's role.
    pub async fn update_role(&self, ctx: &RequestContext, user_id: Uuid, role: UserRole) -> AppResult<User> {
        self.rbac.require_admin(ctx.role())?;

        let mut tx = self.db.begin_write().await?;
        let target = self
            .user_repo
            .find_by_id(tx.conn(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        self.rbac
            .require_role_assignment(ctx.role(), target.role, role)?;
        let user = self
            .user_repo
            .update_role(tx.conn(), user_id, role)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        tx.commit().await?;

        info!(
            target: "audit",
            actor_id = %ctx.user_id(),
            user_id = %user_id,
            from = %target.role,
            to = %role,
            "User role changed"
        );
        Ok(user)
    }

    /// Updates a user's name and/or quota.
    ///
    /// Anyone may rename themself. Changing another user, or any quota,
    /// needs an administrator who outranks the target.
    pub async fn update_user(&self, ctx: &RequestContext, user_id: Uuid, update: UpdateUser) -> AppResult<User> {
        if update.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        let update = UpdateUser {
            name: match update.name {
                Some(name) if name.trim().is_empty() => {
                    return Err(AppError::validation("Name must not be empty"));
                }
                Some(name) => Some(name.trim().to_string()),
                None => None,
            },
            storage_quota: match update.storage_quota {
                Some(quota) if quota < 0 => {
                    return Err(AppError::validation("Storage quota must not be negative"));
                }
                other => other,
            },
        };

        let mut tx = self.db.begin_write().await?;
        let target = self
            .user_repo
            .find_by_id(tx.conn(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if user_id == ctx.user_id() {
            if update.touches_admin_fields() {
                return Err(AppError::forbidden(
                    "Your own quota can only be changed by a higher-ranked administrator",
                ));
            }
        } else {
            self.rbac
                .require_admin_override(&ctx.principal, target.id, target.role, "update")?;
        }

        let user = self
            .user_repo
            .update_profile(tx.conn(), user_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        tx.commit().await?;

        info!(
            actor_id = %ctx.user_id(),
            user_id = %user_id,
            storage_quota = ?update.storage_quota,
            "User updated"
        );
        Ok(user)
    }

    /// Deletes a user together with everything they own and every share
    /// granted to them.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<()> {
        if user_id == ctx.user_id() {
            return Err(AppError::validation("You cannot delete your own account"));
        }

        let mut tx = self.db.begin_write().await?;
        let target = self
            .user_repo
            .find_by_id(tx.conn(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        self.rbac
            .require_admin_override(&ctx.principal, target.id, target.role, "delete")?;

        let folder_ids: Vec<Uuid> = self
            .folder_repo
            .find_by_owner(tx.conn(), user_id)
            .await?
            .into_iter()
            .map(|f| f.id)
            .collect();
        let files = self.file_repo.find_by_owner(tx.conn(), user_id).await?;
        let report = self.tree.purge(tx.conn(), &folder_ids, &files).await?;
        let grants = self.share_repo.delete_for_grantee(tx.conn(), user_id).await?;
        if !self.user_repo.delete(tx.conn(), user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        tx.commit().await?;

        info!(
            target: "audit",
            actor_id = %ctx.user_id(),
            user_id = %user_id,
            folders = report.folders,
            files = report.files,
            shares = report.shares + grants,
            "User deleted"
        );

        self.releases.enqueue(report.blob_refs).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_core::error::ErrorKind;
    use drivehub_entity::permission::{AccessLevel, ResourceRef, SharePermission};

    use crate::test_support::Harness;

    #[tokio::test]
    async fn test_listing_requires_admin() {
        let h = Harness::new().await;
        let admin = h.user_with_role("admin@example.com", UserRole::Admin).await;
        let alice = h.user("alice@example.com").await;

        let err = h.admin.list_users(&alice, PageRequest::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let page = h.admin.list_users(&admin, PageRequest::default()).await.unwrap();
        assert_eq!(page.meta.total, 2);

        let page = h.admin.list_users(&admin, PageRequest::new(u64::MAX, 100)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total, 2);

        let page = h
            .admin
            .search_users(&admin, Some("ALICE"), None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, alice.user_id());

        let page = h
            .admin
            .search_users(&admin, None, Some(UserRole::Admin), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, admin.user_id());
    }

    #[tokio::test]
    async fn test_role_changes_follow_hierarchy() {
        let h = Harness::new().await;
        let root = h.user_with_role("root@example.com", UserRole::SuperAdmin).await;
        let admin = h.user_with_role("admin@example.com", UserRole::Admin).await;
        let alice = h.user("alice@example.com").await;

        // ADMIN cannot promote to its own level.
        let err = h
            .admin
            .update_role(&admin, alice.user_id(), UserRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = h
            .admin
            .update_role(&root, alice.user_id(), UserRole::SuperAdmin)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let user = h
            .admin
            .update_role(&root, alice.user_id(), UserRole::Admin)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Admin);

        let err = h
            .admin
            .update_role(&admin, alice.user_id(), UserRole::User)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = h
            .admin
            .update_role(&root, Uuid::new_v4(), UserRole::User)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_user_profile_and_quota() {
        let h = Harness::new().await;
        let admin = h.user_with_role("admin@example.com", UserRole::Admin).await;
        let alice = h.user("alice@example.com").await;

        let me = h
            .admin
            .update_user(
                &alice,
                alice.user_id(),
                UpdateUser {
                    name: Some(" Alice A. ".to_string()),
                    storage_quota: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(me.name, "Alice A.");

        let err = h
            .admin
            .update_user(
                &alice,
                alice.user_id(),
                UpdateUser {
                    name: None,
                    storage_quota: Some(1_000_000),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = h
            .admin
            .update_user(&admin, alice.user_id(), UpdateUser::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let user = h
            .admin
            .update_user(
                &admin,
                alice.user_id(),
                UpdateUser {
                    name: None,
                    storage_quota: Some(5),
                },
            )
            .await
            .unwrap();
        assert_eq!(user.storage_quota, 5);

        let err = h
            .admin
            .update_user(
                &alice,
                admin.user_id(),
                UpdateUser {
                    name: Some("x".to_string()),
                    storage_quota: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_delete_user_removes_everything_they_own() {
        let h = Harness::new().await;
        let admin = h.user_with_role("admin@example.com", UserRole::Admin).await;
        let alice = h.user("alice@example.com").await;
        let bob = h.user("bob@example.com").await;

        let docs = h.folders.create_folder(&alice, "Docs", None).await.unwrap();
        h.upload(&alice, "a.txt", Some(docs.id), b"aaa").await;
        h.upload(&alice, "b.txt", None, b"bb").await;
        let bobs = h.upload(&bob, "bob.txt", None, b"b").await;
        h.files.set_file_access(&bob, bobs.id, AccessLevel::Shared).await.unwrap();
        h.shares
            .share(&bob, ResourceRef::file(bobs.id), "alice@example.com", SharePermission::View)
            .await
            .unwrap();

        let err = h.admin.delete_user(&admin, admin.user_id()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = h.admin.delete_user(&bob, alice.user_id()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        h.admin.delete_user(&admin, alice.user_id()).await.unwrap();

        let err = h.admin.get_user(&admin, alice.user_id()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(h.shares.list_shares(&bob, ResourceRef::file(bobs.id)).await.unwrap().is_empty());

        h.releases.flush().await;
        assert_eq!(h.blobs.len().await, 1);
        assert!(h.blobs.contains(&bobs.blob_ref).await);
    }
}
