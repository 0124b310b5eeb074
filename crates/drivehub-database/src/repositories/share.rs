//! Share repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_entity::permission::ResourceRef;
use drivehub_entity::share::model::{CreateShare, Share};

use super::db_err;

/// Repository for explicit per-user grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareRepository;

impl ShareRepository {
    /// Create a new share repository.
    pub fn new() -> Self {
        Self
    }

    /// Create a share, or replace the permission of an existing one for the
    /// same resource and grantee.
    pub async fn upsert(&self, conn: &mut SqliteConnection, data: &CreateShare) -> AppResult<Share> {
        sqlx::query_as::<_, Share>(
            "INSERT INTO shares (resource_type, resource_id, grantee_id, permission, created_by, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (resource_type, resource_id, grantee_id) DO UPDATE SET \
                 permission = excluded.permission, \
                 created_by = excluded.created_by, \
                 created_at = excluded.created_at \
             RETURNING *",
        )
        .bind(data.resource.resource_type)
        .bind(data.resource.id)
        .bind(data.grantee_id)
        .bind(data.permission)
        .bind(data.created_by)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to save share"))
    }

    /// Find the share a grantee holds on a resource.
    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        resource: ResourceRef,
        grantee_id: Uuid,
    ) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE resource_type = ? AND resource_id = ? AND grantee_id = ?",
        )
        .bind(resource.resource_type)
        .bind(resource.id)
        .bind(grantee_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to find share"))
    }

    /// List every share on a resource.
    pub async fn find_for_resource(
        &self,
        conn: &mut SqliteConnection,
        resource: ResourceRef,
    ) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE resource_type = ? AND resource_id = ? ORDER BY created_at ASC",
        )
        .bind(resource.resource_type)
        .bind(resource.id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list shares"))
    }

    /// List every share held by a grantee.
    pub async fn find_for_grantee(
        &self,
        conn: &mut SqliteConnection,
        grantee_id: Uuid,
    ) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE grantee_id = ?")
            .bind(grantee_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list shares for grantee"))
    }

    /// Remove one grantee's share on a resource. Returns `true` if removed.
    pub async fn delete(
        &self,
        conn: &mut SqliteConnection,
        resource: ResourceRef,
        grantee_id: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM shares WHERE resource_type = ? AND resource_id = ? AND grantee_id = ?",
        )
        .bind(resource.resource_type)
        .bind(resource.id)
        .bind(grantee_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to revoke share"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every share on a resource.
    pub async fn delete_for_resource(
        &self,
        conn: &mut SqliteConnection,
        resource: ResourceRef,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM shares WHERE resource_type = ? AND resource_id = ?")
            .bind(resource.resource_type)
            .bind(resource.id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete shares for resource"))?;
        Ok(result.rows_affected())
    }

    /// Remove every share held by a grantee.
    pub async fn delete_for_grantee(&self, conn: &mut SqliteConnection, grantee_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM shares WHERE grantee_id = ?")
            .bind(grantee_id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete shares for grantee"))?;
        Ok(result.rows_affected())
    }
}
