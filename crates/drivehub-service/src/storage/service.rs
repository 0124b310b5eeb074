//! Storage quota reporting and recomputation.

use tracing::{info, warn};
use uuid::Uuid;

use drivehub_auth::rbac::RoleEnforcer;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{FileRepository, UserRepository};
use drivehub_entity::storage::StorageQuota;

use crate::context::RequestContext;

/// Reports and repairs per-user storage usage.
#[derive(Debug, Clone)]
pub struct StorageService {
    /// Database pool.
    db: DatabasePool,
    /// User repository.
    user_repo: UserRepository,
    /// File repository.
    file_repo: FileRepository,
    /// Role enforcement.
    rbac: RoleEnforcer,
}

impl StorageService {
    /// Creates a new storage service.
    pub fn new(db: DatabasePool) -> Self {
        Self {
            db,
            user_repo: UserRepository::new(),
            file_repo: FileRepository::new(),
            rbac: RoleEnforcer::new(),
        }
    }

    /// Quota and usage of the caller.
    pub async fn storage_info(&self, ctx: &RequestContext) -> AppResult<StorageQuota> {
        let mut conn = self.db.acquire().await?;
        let user = self
            .user_repo
            .find_by_id(&mut conn, ctx.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(user.quota())
    }

    /// Recompute a user's usage from their files.
    ///
    /// Users may recompute their own usage; anyone else's needs ADMIN.
    /// Returns the corrected quota snapshot.
    pub async fn recalculate_usage(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<StorageQuota> {
        if user_id != ctx.user_id() {
            self.rbac.require_admin(ctx.role())?;
        }

        let mut tx = self.db.begin_write().await?;
        let before = self
            .user_repo
            .find_by_id(tx.conn(), user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let actual = self.file_repo.total_size_by_owner(tx.conn(), user_id).await?;
        let user = self
            .user_repo
            .set_storage_used(tx.conn(), user_id, actual)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        tx.commit().await?;

        if before.storage_used != actual {
            warn!(
                user_id = %user_id,
                recorded = before.storage_used,
                actual,
                "Storage usage drift corrected"
            );
        } else {
            info!(user_id = %user_id, used = actual, "Storage usage verified");
        }
        Ok(user.quota())
    }
}
