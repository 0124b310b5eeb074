//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use drivehub_auth::jwt::JwtDecoder;
use drivehub_core::config::AppConfig;
use drivehub_database::DatabasePool;
use drivehub_service::file::{DownloadService, FileService, UploadService};
use drivehub_service::folder::FolderService;
use drivehub_service::search::SearchService;
use drivehub_service::share::{LinkService, ShareService};
use drivehub_service::storage::StorageService;
use drivehub_service::user::{AdminUserService, UserService};
use drivehub_storage::{ReleaseQueue, StorageManager};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite pool
    pub db: DatabasePool,
    /// Blob store
    pub storage: StorageManager,
    /// Background blob release
    pub releases: ReleaseQueue,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token verifier
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Directory provisioning
    pub user_service: UserService,
    /// User administration
    pub admin_user_service: AdminUserService,
    /// Folder hierarchy
    pub folder_service: FolderService,
    /// File metadata
    pub file_service: FileService,
    /// Uploads
    pub upload_service: UploadService,
    /// Authenticated downloads
    pub download_service: DownloadService,
    /// Public links
    pub link_service: LinkService,
    /// Per-user shares
    pub share_service: ShareService,
    /// Name search
    pub search_service: SearchService,
    /// Quota reporting
    pub storage_service: StorageService,
}

impl AppState {
    /// Wire every service to the given infrastructure.
    pub fn new(
        config: AppConfig,
        db: DatabasePool,
        storage: StorageManager,
        releases: ReleaseQueue,
    ) -> Self {
        let max_depth = config.quota.max_path_depth;

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            user_service: UserService::new(db.clone(), config.quota.default_quota_bytes),
            admin_user_service: AdminUserService::new(db.clone(), releases.clone(), max_depth),
            folder_service: FolderService::new(db.clone(), releases.clone(), max_depth),
            file_service: FileService::new(db.clone(), releases.clone()),
            upload_service: UploadService::new(
                db.clone(),
                storage.clone(),
                releases.clone(),
                config.storage.max_upload_size_bytes,
            ),
            download_service: DownloadService::new(db.clone(), storage.clone()),
            link_service: LinkService::new(
                db.clone(),
                storage.clone(),
                &config.server.public_base_url,
            ),
            share_service: ShareService::new(db.clone()),
            search_service: SearchService::new(db.clone()),
            storage_service: StorageService::new(db.clone()),
            config: Arc::new(config),
            db,
            storage,
            releases,
        }
    }
}
