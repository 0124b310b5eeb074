//! User repository implementation.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_core::types::pagination::{PageRequest, PageResponse};
use drivehub_entity::user::model::{CreateUser, UpdateUser};
use drivehub_entity::user::{User, UserRole};

use super::db_err;

/// Repository for the user directory and quota accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Create a new user repository.
    pub fn new() -> Self {
        Self
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find user by id"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, conn: &mut SqliteConnection, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to find user by email"))
    }

    /// Insert a new user.
    pub async fn create(&self, conn: &mut SqliteConnection, data: &CreateUser) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, name, role, storage_quota, storage_used, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, 0, ?, ?) RETURNING *",
        )
        .bind(data.id)
        .bind(data.email.trim())
        .bind(&data.name)
        .bind(data.role)
        .bind(data.storage_quota)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create user"))
    }

    /// List all users, oldest first.
    pub async fn find_all(&self, conn: &mut SqliteConnection, page: &PageRequest) -> AppResult<PageResponse<User>> {
        self.search(conn, None, None, page).await
    }

    /// Search users by email or name substring and/or role.
    pub async fn search(
        &self,
        conn: &mut SqliteConnection,
        term: Option<&str>,
        role: Option<UserRole>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let pattern = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", escape_like(t)));

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count, pattern.as_deref(), role);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err("Failed to count users"))?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM users");
        push_filters(&mut select, pattern.as_deref(), role);
        select
            .push(" ORDER BY created_at ASC, id ASC LIMIT ")
            .push_bind(i64::try_from(page.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        let users = select
            .build_query_as::<User>()
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list users"))?;

        Ok(PageResponse::new(users, page, total.max(0) as u64))
    }

    /// Change a user's role.
    pub async fn update_role(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        role: UserRole,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("UPDATE users SET role = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(role)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to update user role"))
    }

    /// Apply a profile update. Absent fields are left unchanged.
    pub async fn update_profile(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        data: &UpdateUser,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE(?, name), \
             storage_quota = COALESCE(?, storage_quota), updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(data.name.as_deref())
        .bind(data.storage_quota)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to update user"))
    }

    /// Atomically add `bytes` to the user's usage if it stays within quota.
    ///
    /// Returns `false` when the reservation would exceed the quota or the
    /// user does not exist.
    pub async fn reserve_storage(&self, conn: &mut SqliteConnection, id: Uuid, bytes: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET storage_used = storage_used + ?, updated_at = ? \
             WHERE id = ? AND storage_used + ? <= storage_quota",
        )
        .bind(bytes)
        .bind(Utc::now())
        .bind(id)
        .bind(bytes)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to reserve storage"))?;
        Ok(result.rows_affected() == 1)
    }

    /// Subtract `bytes` from the user's usage, never going below zero.
    pub async fn release_storage(&self, conn: &mut SqliteConnection, id: Uuid, bytes: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET storage_used = MAX(storage_used - ?, 0), updated_at = ? WHERE id = ?",
        )
        .bind(bytes)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to release storage"))?;
        Ok(())
    }

    /// Overwrite the user's usage counter.
    pub async fn set_storage_used(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        used: i64,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET storage_used = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(used)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to set storage usage"))
    }

    /// Delete a user row and record its id as deleted. Returns `true` if a
    /// row was removed.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete user"))?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        sqlx::query("INSERT OR REPLACE INTO deleted_users (id, deleted_at) VALUES (?, ?)")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to record deleted user"))?;
        Ok(true)
    }

    /// Whether `id` belonged to a user that has been deleted.
    pub async fn is_deleted(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM deleted_users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err("Failed to check deleted users"))?;
        Ok(found.is_some())
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, pattern: Option<&'a str>, role: Option<UserRole>) {
    let mut keyword = " WHERE ";
    if let Some(pattern) = pattern {
        builder
            .push(keyword)
            .push("(email LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\' OR name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
        keyword = " AND ";
    }
    if let Some(role) = role {
        builder.push(keyword).push("role = ").push_bind(role);
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
