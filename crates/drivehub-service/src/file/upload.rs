//! File upload.
//!
//! Bytes go to the blob store first; the file row is only created once the
//! store has confirmed them. Quota is reserved with a single conditional
//! update inside the insert transaction.

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{FileRepository, UserRepository};
use drivehub_entity::file::{CreateFile, File};
use drivehub_entity::naming::normalize_name;
use drivehub_entity::permission::AccessLevel;
use drivehub_storage::{ReleaseQueue, StorageManager};

use crate::context::RequestContext;
use crate::permission::PermissionService;

/// Parameters of a single-request upload.
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target folder (`None` for the caller's root).
    pub parent_id: Option<Uuid>,
    /// File name.
    pub name: String,
    /// MIME type reported by the client, if any.
    pub mime_type: Option<String>,
    /// Initial visibility.
    pub access_level: AccessLevel,
    /// File content.
    pub data: Bytes,
}

/// Handles file uploads.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Database pool.
    db: DatabasePool,
    /// Blob store.
    storage: StorageManager,
    /// Background blob release.
    releases: ReleaseQueue,
    /// File repository.
    file_repo: FileRepository,
    /// User repository.
    user_repo: UserRepository,
    /// Item authorization.
    permissions: PermissionService,
    /// Largest accepted upload.
    max_upload_size_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        db: DatabasePool,
        storage: StorageManager,
        releases: ReleaseQueue,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            db,
            storage,
            releases,
            file_repo: FileRepository::new(),
            user_repo: UserRepository::new(),
            permissions: PermissionService::new(),
            max_upload_size_bytes,
        }
    }

    /// Stores the bytes, then records the file and charges the owner's quota.
    pub async fn upload(&self, ctx: &RequestContext, params: UploadParams) -> AppResult<File> {
        let name = normalize_name(&params.name)?;
        let size = params.data.len() as u64;
        if size > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        let size_bytes = i64::try_from(size)
            .map_err(|_| AppError::validation("File is too large"))?;

        {
            let mut conn = self.db.acquire().await?;
            self.permissions
                .parent_for_new_item(&mut conn, ctx.user_id(), params.parent_id)
                .await?;
        }

        let mime_type = params
            .mime_type
            .filter(|m| !m.trim().is_empty() && m != "application/octet-stream")
            .unwrap_or_else(|| {
                mime_guess::from_path(&name)
                    .first_or_octet_stream()
                    .to_string()
            });

        let blob_ref = self.storage.store(params.data).await?;

        let record = CreateFile {
            name,
            parent_id: params.parent_id,
            owner_id: ctx.user_id(),
            mime_type,
            size_bytes,
            access_level: params.access_level,
            blob_ref: blob_ref.clone(),
        };

        match self.record(ctx, &record).await {
            Ok(file) => {
                info!(
                    user_id = %ctx.user_id(),
                    file_id = %file.id,
                    size_bytes = file.size_bytes,
                    mime_type = %file.mime_type,
                    "File uploaded"
                );
                Ok(file)
            }
            Err(e) => {
                warn!(
                    user_id = %ctx.user_id(),
                    blob_ref = %blob_ref,
                    error = %e,
                    "Upload rejected after storing content; releasing blob"
                );
                self.releases.enqueue([blob_ref]).await;
                Err(e)
            }
        }
    }

    async fn record(&self, ctx: &RequestContext, record: &CreateFile) -> AppResult<File> {
        let mut tx = self.db.begin_write().await?;

        // The parent may have been deleted or moved while the bytes were
        // being stored.
        self.permissions
            .parent_for_new_item(tx.conn(), ctx.user_id(), record.parent_id)
            .await?;

        let reserved = self
            .user_repo
            .reserve_storage(tx.conn(), record.owner_id, record.size_bytes)
            .await?;
        if !reserved {
            let user = self
                .user_repo
                .find_by_id(tx.conn(), record.owner_id)
                .await?
                .ok_or_else(|| AppError::not_found("User not found"))?;
            return Err(AppError::quota_exceeded(format!(
                "Uploading {} bytes would exceed the storage quota ({} of {} bytes used)",
                record.size_bytes, user.storage_used, user.storage_quota
            )));
        }

        let file = self.file_repo.create(tx.conn(), record).await?;
        tx.commit().await?;
        Ok(file)
    }
}
