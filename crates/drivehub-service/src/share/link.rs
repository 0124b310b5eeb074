//! Public link tokens.
//!
//! A token is 32 bytes from the OS-seeded CSPRNG, URL-safe base64 without
//! padding. Issuing replaces the file's token, so every earlier copy stops
//! resolving. Changing the access level leaves the token alone; it simply
//! does not resolve while the file is not PUBLIC.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bytes::Bytes;
use rand::RngCore;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_database::repositories::FileRepository;
use drivehub_entity::file::File;
use drivehub_entity::permission::SharePermission;
use drivehub_storage::StorageManager;

use crate::context::RequestContext;
use crate::permission::PermissionService;

/// Length of the random part of a token, in bytes.
const TOKEN_BYTES: usize = 32;

/// Attempts before giving up on a token collision.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Message for every failed resolution, so unknown and inert tokens are
/// indistinguishable.
const UNRESOLVED: &str = "Public link not found";

/// A freshly issued public link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicLink {
    /// The token.
    pub public_token: String,
    /// Absolute download URL.
    pub url: String,
}

/// Issues and resolves public link tokens.
#[derive(Debug, Clone)]
pub struct LinkService {
    /// Database pool.
    db: DatabasePool,
    /// Blob store.
    storage: StorageManager,
    /// File repository.
    file_repo: FileRepository,
    /// Item authorization.
    permissions: PermissionService,
    /// Base URL links are built on.
    public_base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(db: DatabasePool, storage: StorageManager, public_base_url: &str) -> Self {
        Self {
            db,
            storage,
            file_repo: FileRepository::new(),
            permissions: PermissionService::new(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Generates a cryptographically secure random token.
    pub fn generate_token(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// The public download URL for a token.
    pub fn url_for(&self, token: &str) -> String {
        format!("{}/api/files/public/{token}", self.public_base_url)
    }

    /// Issues a new token for a file, invalidating any previous one.
    pub async fn issue(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<PublicLink> {
        let mut tx = self.db.begin_write().await?;
        self.permissions
            .file(tx.conn(), Some(ctx.user_id()), file_id, SharePermission::Manage)
            .await?;

        let mut attempt = 0;
        let file = loop {
            attempt += 1;
            let token = self.generate_token();
            match self.file_repo.set_public_token(tx.conn(), file_id, &token).await {
                Ok(Some(file)) => break file,
                Ok(None) => return Err(AppError::not_found("File not found")),
                Err(e) if e.is(ErrorKind::Conflict) && attempt < MAX_ISSUE_ATTEMPTS => {
                    warn!(file_id = %file_id, attempt, "Public token collision, retrying");
                }
                Err(e) => return Err(e),
            }
        };
        tx.commit().await?;

        let token = file
            .public_token
            .ok_or_else(|| AppError::internal("Issued token was not stored"))?;
        info!(
            user_id = %ctx.user_id(),
            file_id = %file_id,
            access_level = %file.access_level,
            "Public link issued"
        );

        Ok(PublicLink {
            url: self.url_for(&token),
            public_token: token,
        })
    }

    /// Resolves a token to its file, anonymously.
    ///
    /// Succeeds only while the file is PUBLIC.
    pub async fn resolve(&self, token: &str) -> AppResult<File> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::not_found(UNRESOLVED));
        }
        let mut conn = self.db.acquire().await?;
        self.file_repo
            .find_by_public_token(&mut conn, token)
            .await?
            .filter(File::is_publicly_reachable)
            .ok_or_else(|| AppError::not_found(UNRESOLVED))
    }

    /// Resolves a token and returns the file's content.
    pub async fn download(&self, token: &str) -> AppResult<(File, Bytes)> {
        let file = self.resolve(token).await?;
        let data = self.storage.read(&file.blob_ref).await?;
        Ok((file, data))
    }
}
