//! In-memory blob store with fault injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::blob::{BlobRef, BlobStore};

/// Blob store backed by a hash map.
///
/// Used by tests and by `provider = "memory"` deployments. The fault knobs
/// make it possible to exercise the upstream-failure paths of the services.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobRef, Bytes>>,
    fail_stores: AtomicBool,
    failing_releases: AtomicU32,
    delay_ms: AtomicU64,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `store` call fail (or succeed again).
    pub fn set_fail_stores(&self, fail: bool) {
        self.fail_stores.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` `release` calls fail.
    pub fn fail_next_releases(&self, count: u32) {
        self.failing_releases.store(count, Ordering::SeqCst);
    }

    /// Delay every call by the given duration.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis().try_into().unwrap_or(u64::MAX), Ordering::SeqCst);
    }

    /// Whether a blob is currently held.
    pub async fn contains(&self, blob_ref: &BlobRef) -> bool {
        self.blobs.read().await.contains_key(blob_ref)
    }

    /// Number of blobs currently held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    async fn stall(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.fail_stores.load(Ordering::SeqCst))
    }

    async fn store(&self, data: Bytes) -> AppResult<BlobRef> {
        self.stall().await;
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(AppError::upstream_unavailable("Injected store failure"));
        }
        let blob_ref = BlobRef::new(Uuid::new_v4().to_string());
        self.blobs.write().await.insert(blob_ref.clone(), data);
        Ok(blob_ref)
    }

    async fn read(&self, blob_ref: &BlobRef) -> AppResult<Bytes> {
        self.stall().await;
        self.blobs
            .read()
            .await
            .get(blob_ref)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {blob_ref}")))
    }

    async fn release(&self, blob_ref: &BlobRef) -> AppResult<()> {
        self.stall().await;
        let injected = self
            .failing_releases
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(AppError::upstream_unavailable("Injected release failure"));
        }
        self.blobs.write().await.remove(blob_ref);
        Ok(())
    }
}
