//! Users repository for database operations

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{DirectoryUser, Role, User},
};

/// Per-role user counts for the directory listing
#[derive(Debug, Clone, Copy)]
pub struct RoleCounts {
    pub total: i64,
    pub regular_users: i64,
    pub admins: i64,
    pub owners: i64,
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if an email is already registered
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a user with the given password hash
    pub async fn create(&self, name: &str, email: &str, password_hash: &str, role: Role) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// List all users across every role, newest first
    pub async fn list_all(&self) -> AppResult<Vec<DirectoryUser>> {
        let users = sqlx::query_as::<_, DirectoryUser>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Count users broken down by role
    pub async fn role_counts(&self) -> AppResult<RoleCounts> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as total,
                   COUNT(*) FILTER (WHERE role = 'user') as regular_users,
                   COUNT(*) FILTER (WHERE role = 'admin') as admins,
                   COUNT(*) FILTER (WHERE role = 'owner') as owners
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(RoleCounts {
            total: row.get("total"),
            regular_users: row.get("regular_users"),
            admins: row.get("admins"),
            owners: row.get("owners"),
        })
    }

    /// Change a user's role. With roles collapsed into a single column this
    /// is one field update rather than a cross-partition move.
    pub async fn update_role(&self, id: Uuid, role: Role) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    /// Most recent registrations
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<DirectoryUser>> {
        let users = sqlx::query_as::<_, DirectoryUser>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
