//! Authenticated file download.

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_entity::file::File;
use drivehub_entity::permission::SharePermission;
use drivehub_storage::StorageManager;

use crate::context::RequestContext;
use crate::permission::PermissionService;

/// Serves file content to callers holding VIEW.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Database pool.
    db: DatabasePool,
    /// Blob store.
    storage: StorageManager,
    /// Item authorization.
    permissions: PermissionService,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(db: DatabasePool, storage: StorageManager) -> Self {
        Self {
            db,
            storage,
            permissions: PermissionService::new(),
        }
    }

    /// Returns the file's metadata and content.
    pub async fn download(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<(File, Bytes)> {
        let file = {
            let mut conn = self.db.acquire().await?;
            self.permissions
                .file(&mut conn, Some(ctx.user_id()), file_id, SharePermission::View)
                .await?
        };
        let data = self.storage.read(&file.blob_ref).await?;
        debug!(user_id = %ctx.user_id(), file_id = %file_id, bytes = data.len(), "File downloaded");
        Ok((file, data))
    }
}
