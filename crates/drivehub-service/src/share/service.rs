//! Explicit per-user shares.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{ShareRepository, UserRepository};
use drivehub_entity::permission::{ResourceRef, SharePermission};
use drivehub_entity::share::{CreateShare, Share};

use crate::context::RequestContext;
use crate::permission::PermissionService;

/// A share together with the grantee's directory entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEntry {
    /// The grant.
    #[serde(flatten)]
    pub share: Share,
    /// Grantee email.
    pub email: String,
    /// Grantee display name.
    pub name: String,
}

/// Manages share creation, listing, and revocation.
///
/// Sharing never changes an item's access level; a share only takes
/// effect while the item is SHARED.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Database pool.
    db: DatabasePool,
    /// Share repository.
    share_repo: ShareRepository,
    /// User repository.
    user_repo: UserRepository,
    /// Item authorization.
    permissions: PermissionService,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(db: DatabasePool) -> Self {
        Self {
            db,
            share_repo: ShareRepository::new(),
            user_repo: UserRepository::new(),
            permissions: PermissionService::new(),
        }
    }

    /// Grants `permission` on `resource` to the user with `grantee_email`,
    /// replacing any existing grant for that user.
    pub async fn share(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
        grantee_email: &str,
        permission: SharePermission,
    ) -> AppResult<Share> {
        let email = grantee_email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Grantee email is required"));
        }

        let mut tx = self.db.begin_write().await?;
        let owner_id = self
            .permissions
            .resource_owner(tx.conn(), Some(ctx.user_id()), resource, SharePermission::Manage)
            .await?;
        let grantee = self
            .user_repo
            .find_by_email(tx.conn(), email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No user with email '{email}'")))?;
        if grantee.id == owner_id {
            return Err(AppError::validation("An item cannot be shared with its owner"));
        }

        let share = self
            .share_repo
            .upsert(
                tx.conn(),
                &CreateShare {
                    resource,
                    grantee_id: grantee.id,
                    permission,
                    created_by: ctx.user_id(),
                },
            )
            .await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            resource = %resource,
            grantee_id = %grantee.id,
            permission = %permission,
            "Share granted"
        );
        Ok(share)
    }

    /// Lists every share on an item.
    pub async fn list_shares(&self, ctx: &RequestContext, resource: ResourceRef) -> AppResult<Vec<ShareEntry>> {
        let mut conn = self.db.acquire().await?;
        self.permissions
            .resource_owner(&mut conn, Some(ctx.user_id()), resource, SharePermission::Manage)
            .await?;

        let shares = self.share_repo.find_for_resource(&mut conn, resource).await?;
        let mut entries = Vec::with_capacity(shares.len());
        for share in shares {
            let Some(user) = self.user_repo.find_by_id(&mut conn, share.grantee_id).await? else {
                continue;
            };
            entries.push(ShareEntry {
                share,
                email: user.email,
                name: user.name,
            });
        }
        Ok(entries)
    }

    /// Removes one grantee's share on an item.
    pub async fn revoke(&self, ctx: &RequestContext, resource: ResourceRef, grantee_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin_write().await?;
        self.permissions
            .resource_owner(tx.conn(), Some(ctx.user_id()), resource, SharePermission::Manage)
            .await?;
        if !self.share_repo.delete(tx.conn(), resource, grantee_id).await? {
            return Err(AppError::not_found("Share not found"));
        }
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            resource = %resource,
            grantee_id = %grantee_id,
            "Share revoked"
        );
        Ok(())
    }
}
