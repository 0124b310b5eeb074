//! Blob store trait for pluggable content backends.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Opaque reference to a stored blob.
///
/// Only the provider that produced a reference knows how to interpret it;
/// everything else treats it as an uninterpreted string and never shows it
/// to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    /// Wrap a provider-specific reference string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for blob content backends.
///
/// The trait is defined here in `drivehub-core` and implemented in
/// `drivehub-storage` (local filesystem and in-memory providers). Bytes are
/// immutable once stored: there is no update, only store and release.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Persist the bytes and return a fresh reference to them.
    async fn store(&self, data: Bytes) -> AppResult<BlobRef>;

    /// Read the complete content behind a reference.
    async fn read(&self, blob_ref: &BlobRef) -> AppResult<Bytes>;

    /// Release the content behind a reference. Releasing an unknown
    /// reference succeeds.
    async fn release(&self, blob_ref: &BlobRef) -> AppResult<()>;
}
