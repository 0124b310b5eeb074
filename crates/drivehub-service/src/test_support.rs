//! Shared fixtures for service tests.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use drivehub_core::config::storage::ReleaseConfig;
use drivehub_database::DatabasePool;
use drivehub_entity::file::File;
use drivehub_entity::permission::AccessLevel;
use drivehub_entity::user::{Principal, UserRole};
use drivehub_storage::providers::MemoryBlobStore;
use drivehub_storage::{ReleaseQueue, StorageManager};

use crate::context::RequestContext;
use crate::file::{DownloadService, FileService, UploadParams, UploadService};
use crate::folder::FolderService;
use crate::search::SearchService;
use crate::share::{LinkService, ShareService};
use crate::storage::StorageService;
use crate::user::{AdminUserService, UserService};

pub const MAX_DEPTH: usize = 64;
pub const MAX_UPLOAD: u64 = 1024 * 1024;

/// An in-memory database, an in-memory blob store, and every service
/// wired to them.
pub struct Harness {
    pub db: DatabasePool,
    pub blobs: Arc<MemoryBlobStore>,
    pub releases: ReleaseQueue,
    pub folders: FolderService,
    pub files: FileService,
    pub uploads: UploadService,
    pub downloads: DownloadService,
    pub links: LinkService,
    pub shares: ShareService,
    pub search: SearchService,
    pub storage: StorageService,
    pub users: UserService,
    pub admin: AdminUserService,
}

impl Harness {
    pub async fn new() -> Self {
        let db = DatabasePool::memory().await.unwrap();
        let blobs = Arc::new(MemoryBlobStore::new());
        let storage = StorageManager::new(blobs.clone(), Duration::from_millis(500));
        let (releases, _worker) = ReleaseQueue::spawn(
            storage.clone(),
            &ReleaseConfig {
                max_attempts: 3,
                initial_backoff_ms: 1,
                queue_capacity: 64,
            },
        );

        Self {
            folders: FolderService::new(db.clone(), releases.clone(), MAX_DEPTH),
            files: FileService::new(db.clone(), releases.clone()),
            uploads: UploadService::new(db.clone(), storage.clone(), releases.clone(), MAX_UPLOAD),
            downloads: DownloadService::new(db.clone(), storage.clone()),
            links: LinkService::new(db.clone(), storage.clone(), "http://drive.test"),
            shares: ShareService::new(db.clone()),
            search: SearchService::new(db.clone()),
            storage: StorageService::new(db.clone()),
            users: UserService::new(db.clone(), 10_000),
            admin: AdminUserService::new(db.clone(), releases.clone(), MAX_DEPTH),
            db,
            blobs,
            releases,
        }
    }

    /// Register a user and return a context acting as them.
    pub async fn user(&self, email: &str) -> RequestContext {
        self.user_with_role(email, UserRole::User).await
    }

    pub async fn user_with_role(&self, email: &str, role: UserRole) -> RequestContext {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            role,
        };
        self.users.ensure_registered(&principal).await.unwrap();
        RequestContext::new(principal)
    }

    /// Upload `data` as `name` under `parent_id`.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<Uuid>,
        data: &'static [u8],
    ) -> File {
        self.uploads
            .upload(
                ctx,
                UploadParams {
                    parent_id,
                    name: name.to_string(),
                    mime_type: None,
                    access_level: AccessLevel::Private,
                    data: Bytes::from_static(data),
                },
            )
            .await
            .unwrap()
    }
}
