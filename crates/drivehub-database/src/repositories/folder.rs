//! Folder repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_entity::folder::model::{CreateFolder, Folder};
use drivehub_entity::permission::AccessLevel;

use super::db_err;

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderRepository;

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new() -> Self {
        Self
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find folder"))
    }

    /// List the direct child folders of a folder.
    pub async fn find_children(
        &self,
        conn: &mut SqliteConnection,
        parent_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = ?")
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list child folders"))
    }

    /// List an owner's root-level folders.
    pub async fn find_roots(&self, conn: &mut SqliteConnection, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id IS NULL AND owner_id = ?",
        )
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list root folders"))
    }

    /// List the IDs of the direct child folders of a folder.
    pub async fn find_child_ids(
        &self,
        conn: &mut SqliteConnection,
        parent_id: Uuid,
    ) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM folders WHERE parent_id = ?")
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list child folder ids"))
    }

    /// List every folder owned by a user.
    pub async fn find_by_owner(&self, conn: &mut SqliteConnection, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list folders by owner"))
    }

    /// List folders carrying a share for the given grantee.
    pub async fn find_shared_with(
        &self,
        conn: &mut SqliteConnection,
        grantee_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT f.* FROM folders f \
             INNER JOIN shares s ON s.resource_type = 'folder' AND s.resource_id = f.id \
             WHERE s.grantee_id = ?",
        )
        .bind(grantee_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list shared folders"))
    }

    /// Create a new folder.
    pub async fn create(&self, conn: &mut SqliteConnection, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, name, parent_id, owner_id, access_level, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .bind(data.access_level)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create folder"))
    }

    /// Rename a folder. Returns `None` if the folder no longer exists.
    pub async fn rename(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to rename folder"))
    }

    /// Re-parent a folder. Returns `None` if the folder no longer exists.
    pub async fn set_parent(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(parent_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to move folder"))
    }

    /// Change a folder's access level. Returns `None` if the folder no
    /// longer exists.
    pub async fn set_access_level(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        level: AccessLevel,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET access_level = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(level)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to change folder access level"))
    }

    /// Delete a single folder row. Returns `true` if a row was removed.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete folder"))?;
        Ok(result.rows_affected() > 0)
    }
}
