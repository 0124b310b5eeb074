//! File repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_entity::file::model::{CreateFile, File};
use drivehub_entity::permission::AccessLevel;

use super::db_err;

/// Repository for file record CRUD and lookup operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRepository;

impl FileRepository {
    /// Create a new file repository.
    pub fn new() -> Self {
        Self
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find file"))
    }

    /// Find a file by its public link token, regardless of access level.
    pub async fn find_by_public_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE public_token = ?")
            .bind(token)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find file by token"))
    }

    /// List the files directly inside a folder.
    pub async fn find_children(&self, conn: &mut SqliteConnection, parent_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE parent_id = ?")
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list files in folder"))
    }

    /// List an owner's root-level files.
    pub async fn find_roots(&self, conn: &mut SqliteConnection, owner_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE parent_id IS NULL AND owner_id = ?")
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list root files"))
    }

    /// List every file owned by a user.
    pub async fn find_by_owner(&self, conn: &mut SqliteConnection, owner_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list files by owner"))
    }

    /// List files carrying a share for the given grantee.
    pub async fn find_shared_with(
        &self,
        conn: &mut SqliteConnection,
        grantee_id: Uuid,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT f.* FROM files f \
             INNER JOIN shares s ON s.resource_type = 'file' AND s.resource_id = f.id \
             WHERE s.grantee_id = ?",
        )
        .bind(grantee_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list shared files"))
    }

    /// Sum the sizes of every file owned by a user.
    pub async fn total_size_by_owner(&self, conn: &mut SqliteConnection, owner_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM files WHERE owner_id = ?",
        )
        .bind(owner_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to sum file sizes"))
    }

    /// Create a new file record.
    pub async fn create(&self, conn: &mut SqliteConnection, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, name, parent_id, owner_id, mime_type, size_bytes, \
             access_level, public_token, blob_ref, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(data.access_level)
        .bind(&data.blob_ref)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create file"))
    }

    /// Rename a file. Returns `None` if the file no longer exists.
    pub async fn rename(&self, conn: &mut SqliteConnection, id: Uuid, name: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("UPDATE files SET name = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to rename file"))
    }

    /// Move a file to another folder. Returns `None` if the file no longer
    /// exists.
    pub async fn set_parent(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET parent_id = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(parent_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to move file"))
    }

    /// Change a file's access level. The public token is left untouched.
    pub async fn set_access_level(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        level: AccessLevel,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET access_level = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(level)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to change file access level"))
    }

    /// Replace the file's public token.
    ///
    /// A token already held by another file surfaces as a `Conflict` error.
    pub async fn set_public_token(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        token: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET public_token = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(token)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to store public token"))
    }

    /// Delete a file row. Returns the deleted row, if it existed.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("DELETE FROM files WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to delete file"))
    }
}
