//! Storage manager: the single entry point services use to reach the blob
//! store, with every call bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use drivehub_core::config::storage::StorageConfig;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::blob::{BlobRef, BlobStore};

use crate::providers::{LocalBlobStore, MemoryBlobStore};

/// Wraps the configured [`BlobStore`] provider.
///
/// Failures and timeouts of the provider surface as
/// `ErrorKind::UpstreamUnavailable`; a blob that does not exist keeps its
/// `NotFound` kind.
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn BlobStore>,
    timeout: Duration,
}

impl StorageManager {
    /// Wrap an existing provider.
    pub fn new(provider: Arc<dyn BlobStore>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Build the provider named in the configuration.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn BlobStore> = match config.provider.as_str() {
            "local" => Arc::new(LocalBlobStore::new(&config.local.root_path).await?),
            "memory" => Arc::new(MemoryBlobStore::new()),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider '{other}'. Expected 'local' or 'memory'"
                )));
            }
        };
        info!(
            provider = provider.provider_type(),
            timeout_ms = config.blob_timeout_ms,
            "Blob store initialised"
        );
        Ok(Self::new(provider, Duration::from_millis(config.blob_timeout_ms)))
    }

    /// The provider's type name.
    pub fn provider_type(&self) -> &str {
        self.provider.provider_type()
    }

    /// Check whether the provider is healthy.
    pub async fn health_check(&self) -> bool {
        self.bounded("health_check", self.provider.health_check())
            .await
            .unwrap_or(false)
    }

    /// Persist bytes and return their reference.
    pub async fn store(&self, data: Bytes) -> AppResult<BlobRef> {
        self.bounded("store", self.provider.store(data)).await
    }

    /// Read the content behind a reference.
    pub async fn read(&self, blob_ref: &BlobRef) -> AppResult<Bytes> {
        self.bounded("read", self.provider.read(blob_ref)).await
    }

    /// Release the content behind a reference.
    pub async fn release(&self, blob_ref: &BlobRef) -> AppResult<()> {
        self.bounded("release", self.provider.release(blob_ref)).await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.kind == ErrorKind::NotFound => Err(e),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Blob store call failed");
                Err(AppError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    format!("Blob store {operation} failed"),
                    e,
                ))
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Blob store call timed out"
                );
                Err(AppError::upstream_unavailable(format!(
                    "Blob store {operation} timed out"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failures_map_to_upstream_unavailable() {
        let memory = Arc::new(MemoryBlobStore::new());
        let manager = StorageManager::new(memory.clone(), Duration::from_secs(1));
        memory.set_fail_stores(true);

        let err = manager.store(Bytes::from_static(b"x")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_provider_times_out() {
        let memory = Arc::new(MemoryBlobStore::new());
        memory.set_delay(Duration::from_secs(60));
        let manager = StorageManager::new(memory.clone(), Duration::from_millis(50));

        let err = manager.store(Bytes::from_static(b"x")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamUnavailable);
        assert!(memory.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_blob_stays_not_found() {
        let manager = StorageManager::new(Arc::new(MemoryBlobStore::new()), Duration::from_secs(1));
        let err = manager.read(&BlobRef::new("nope")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_from_config_rejects_unknown_provider() {
        let config = StorageConfig {
            provider: "ftp".to_string(),
            ..StorageConfig::default()
        };
        let err = StorageManager::from_config(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
