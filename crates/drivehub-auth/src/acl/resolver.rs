//! Share grant lookup feeding the access evaluator.

use std::collections::HashMap;

use sqlx::SqliteConnection;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::repositories::ShareRepository;
use drivehub_entity::permission::{AccessControlled, AccessLevel, ResourceRef, SharePermission};

use super::evaluator::{can_access, effective_permission};

/// Every grant one principal holds, keyed by item.
///
/// Loaded once per request when many items are checked together (listings,
/// search), so each item is decided without another round trip.
#[derive(Debug, Clone, Default)]
pub struct GrantSet {
    principal: Option<Uuid>,
    grants: HashMap<ResourceRef, SharePermission>,
}

impl GrantSet {
    /// An empty set for a principal with no shares (or an anonymous caller).
    pub fn empty(principal: Option<Uuid>) -> Self {
        Self {
            principal,
            grants: HashMap::new(),
        }
    }

    /// The grant held on `resource`, if any.
    pub fn get(&self, resource: &ResourceRef) -> Option<SharePermission> {
        self.grants.get(resource).copied()
    }

    /// Evaluate access to `item` using the loaded grants.
    pub fn can_access<T: AccessControlled + ?Sized>(&self, item: &T, required: SharePermission) -> bool {
        can_access(self.principal, item, self.get(&item.resource()), required)
    }

    /// Whether the principal holds no grants.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Resolves the grant a principal holds on an item and applies the
/// evaluator to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessResolver {
    shares: ShareRepository,
}

impl AccessResolver {
    /// Create a new resolver.
    pub fn new() -> Self {
        Self {
            shares: ShareRepository::new(),
        }
    }

    /// The principal's direct grant on `resource`.
    pub async fn grant_for(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        resource: ResourceRef,
    ) -> AppResult<Option<SharePermission>> {
        let Some(principal) = principal else {
            return Ok(None);
        };
        let share = self.shares.find(conn, resource, principal).await?;
        Ok(share.map(|s| s.permission))
    }

    /// Load every grant the principal holds.
    pub async fn grants_for(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
    ) -> AppResult<GrantSet> {
        let Some(id) = principal else {
            return Ok(GrantSet::empty(None));
        };
        let grants = self
            .shares
            .find_for_grantee(conn, id)
            .await?
            .into_iter()
            .map(|share| (share.resource(), share.permission))
            .collect();
        Ok(GrantSet { principal, grants })
    }

    /// The strongest permission the principal holds on `item`.
    ///
    /// Only `SHARED` items owned by someone else need the share lookup.
    pub async fn permission_on<T: AccessControlled + ?Sized>(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        item: &T,
    ) -> AppResult<Option<SharePermission>> {
        let needs_grant = item.access_level() == AccessLevel::Shared
            && principal.is_some_and(|id| id != item.owner_id());
        let grant = if needs_grant {
            self.grant_for(conn, principal, item.resource()).await?
        } else {
            None
        };
        Ok(effective_permission(principal, item, grant))
    }

    /// Whether the principal may act on `item` at `required`.
    pub async fn check<T: AccessControlled + ?Sized>(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        item: &T,
        required: SharePermission,
    ) -> AppResult<bool> {
        let held = self.permission_on(conn, principal, item).await?;
        Ok(held.is_some_and(|p| p.has_at_least(&required)))
    }

    /// Like [`check`](Self::check), failing with `Forbidden` on denial.
    pub async fn require<T: AccessControlled + ?Sized>(
        &self,
        conn: &mut SqliteConnection,
        principal: Option<Uuid>,
        item: &T,
        required: SharePermission,
    ) -> AppResult<()> {
        if self.check(conn, principal, item, required).await? {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "{required} permission required on {}",
                item.resource()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_core::error::ErrorKind;
    use drivehub_database::DatabasePool;
    use drivehub_database::repositories::{FolderRepository, UserRepository};
    use drivehub_entity::folder::{CreateFolder, Folder};
    use drivehub_entity::share::model::CreateShare;
    use drivehub_entity::user::{CreateUser, UserRole};

    async fn seed_user(conn: &mut SqliteConnection, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        UserRepository::new()
            .create(
                conn,
                &CreateUser {
                    id,
                    email: email.to_string(),
                    name: email.to_string(),
                    role: UserRole::User,
                    storage_quota: 1024,
                },
            )
            .await
            .unwrap();
        id
    }

    async fn seed_folder(conn: &mut SqliteConnection, owner: Uuid, level: AccessLevel) -> Folder {
        FolderRepository::new()
            .create(
                conn,
                &CreateFolder {
                    name: "Docs".to_string(),
                    parent_id: None,
                    owner_id: owner,
                    access_level: level,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_shared_folder_honours_grant_level() {
        let db = DatabasePool::memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let owner = seed_user(&mut conn, "a@example.com").await;
        let grantee = seed_user(&mut conn, "b@example.com").await;
        let folder = seed_folder(&mut conn, owner, AccessLevel::Shared).await;

        ShareRepository::new()
            .upsert(
                &mut conn,
                &CreateShare {
                    resource: folder.resource(),
                    grantee_id: grantee,
                    permission: SharePermission::View,
                    created_by: owner,
                },
            )
            .await
            .unwrap();

        let resolver = AccessResolver::new();
        assert!(resolver
            .check(&mut conn, Some(grantee), &folder, SharePermission::View)
            .await
            .unwrap());
        let err = resolver
            .require(&mut conn, Some(grantee), &folder, SharePermission::Edit)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let grants = resolver.grants_for(&mut conn, Some(grantee)).await.unwrap();
        assert_eq!(grants.get(&folder.resource()), Some(SharePermission::View));
        assert!(grants.can_access(&folder, SharePermission::View));
        assert!(!grants.can_access(&folder, SharePermission::Manage));
    }

    #[tokio::test]
    async fn test_private_folder_ignores_share() {
        let db = DatabasePool::memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let owner = seed_user(&mut conn, "a@example.com").await;
        let grantee = seed_user(&mut conn, "b@example.com").await;
        let folder = seed_folder(&mut conn, owner, AccessLevel::Private).await;

        ShareRepository::new()
            .upsert(
                &mut conn,
                &CreateShare {
                    resource: folder.resource(),
                    grantee_id: grantee,
                    permission: SharePermission::Manage,
                    created_by: owner,
                },
            )
            .await
            .unwrap();

        let resolver = AccessResolver::new();
        assert!(!resolver
            .check(&mut conn, Some(grantee), &folder, SharePermission::View)
            .await
            .unwrap());
        assert!(resolver
            .check(&mut conn, Some(owner), &folder, SharePermission::Manage)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_has_no_grants() {
        let db = DatabasePool::memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let grants = AccessResolver::new().grants_for(&mut conn, None).await.unwrap();
        assert!(grants.is_empty());
    }
}
