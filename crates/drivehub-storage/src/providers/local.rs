//! Local filesystem blob store.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::blob::{BlobRef, BlobStore};

/// Stores each blob as one file under `root/<2-char fan-out>/<uuid>`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::UpstreamUnavailable,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a reference to its path, rejecting anything that is not one
    /// of our UUID references.
    fn resolve(&self, blob_ref: &BlobRef) -> AppResult<PathBuf> {
        let id = Uuid::parse_str(blob_ref.as_str())
            .map_err(|_| AppError::validation(format!("Malformed blob reference: {blob_ref}")))?;
        let name = id.as_hyphenated().to_string();
        Ok(self.root.join(&name[..2]).join(name))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn store(&self, data: Bytes) -> AppResult<BlobRef> {
        let blob_ref = BlobRef::new(Uuid::new_v4().to_string());
        let path = self.resolve(&blob_ref)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write under a temporary name so a crash never leaves a partial blob
        // behind the final name.
        let tmp = path.with_extension("partial");
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        debug!(blob_ref = %blob_ref, bytes = data.len(), "Stored blob");
        Ok(blob_ref)
    }

    async fn read(&self, blob_ref: &BlobRef) -> AppResult<Bytes> {
        let path = self.resolve(blob_ref)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {blob_ref}"))
            } else {
                AppError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    format!("Failed to read blob: {blob_ref}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn release(&self, blob_ref: &BlobRef) -> AppResult<()> {
        let path = self.resolve(blob_ref)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(blob_ref = %blob_ref, "Released blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::UpstreamUnavailable,
                format!("Failed to release blob: {blob_ref}"),
                e,
            )),
        }
    }
}
