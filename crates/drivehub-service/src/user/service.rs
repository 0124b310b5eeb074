//! User directory self-service.

use tracing::{info, warn};

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_database::repositories::UserRepository;
use drivehub_entity::user::{CreateUser, Principal, User};

use crate::context::RequestContext;

/// Provisions verified principals into the directory and serves their
/// own entry.
#[derive(Debug, Clone)]
pub struct UserService {
    /// Database pool.
    db: DatabasePool,
    /// User repository.
    user_repo: UserRepository,
    /// Quota assigned on first sighting.
    default_quota_bytes: i64,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(db: DatabasePool, default_quota_bytes: i64) -> Self {
        Self {
            db,
            user_repo: UserRepository::new(),
            default_quota_bytes: default_quota_bytes.max(0),
        }
    }

    /// Returns the directory entry for a verified principal, creating it
    /// the first time the principal is seen.
    ///
    /// The directory's role is authoritative once the entry exists. A
    /// principal whose account was deleted is refused.
    pub async fn ensure_registered(&self, principal: &Principal) -> AppResult<User> {
        {
            let mut conn = self.db.acquire().await?;
            if let Some(user) = self.user_repo.find_by_id(&mut conn, principal.id).await? {
                return Ok(user);
            }
        }

        let mut tx = self.db.begin_write().await?;
        if let Some(user) = self.user_repo.find_by_id(tx.conn(), principal.id).await? {
            return Ok(user);
        }
        if self.user_repo.is_deleted(tx.conn(), principal.id).await? {
            warn!(user_id = %principal.id, "Rejected token for deleted account");
            return Err(AppError::authentication("Account has been deleted"));
        }
        let user = self
            .user_repo
            .create(
                tx.conn(),
                &CreateUser {
                    id: principal.id,
                    email: principal.email.trim().to_string(),
                    name: principal.display_name(),
                    role: principal.role,
                    storage_quota: self.default_quota_bytes,
                },
            )
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Conflict => AppError::conflict(format!(
                    "Email '{}' is already registered to another user",
                    principal.email
                )),
                _ => e,
            })?;
        tx.commit().await?;

        info!(
            user_id = %user.id,
            role = %user.role,
            storage_quota = user.storage_quota,
            "User registered"
        );
        Ok(user)
    }

    /// The caller's own directory entry.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        let mut conn = self.db.acquire().await?;
        self.user_repo
            .find_by_id(&mut conn, ctx.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
