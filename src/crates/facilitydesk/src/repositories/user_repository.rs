//! User repository for database operations

use super::{from_millis, to_millis};
use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::models::{Role, User};
use crate::store::UserDirectory;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// Repository for users
#[derive(Clone, Debug)]
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List all users, workers ranked by points first
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, role, points, total_jobs, created_at
             FROM users
             ORDER BY points DESC, created_at ASC",
        )
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        role: row.try_get::<String, _>("role")?.parse()?,
        points: row.try_get("points")?,
        total_jobs: row.try_get("total_jobs")?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: &str) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, name, role, points, total_jobs, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to load user: {}", e)))?
        .ok_or_else(|| DeskError::NotFound(format!("User not found: {}", id)))?;

        row_to_user(&row)
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, name, role, points, total_jobs, created_at
             FROM users WHERE role = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(role.as_str())
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to list users by role: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn save(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, role, points, total_jobs, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 role = excluded.role,
                 points = excluded.points,
                 total_jobs = excluded.total_jobs",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.points)
        .bind(user.total_jobs)
        .bind(to_millis(user.created_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to save user: {}", e)))?;

        Ok(())
    }

    async fn award_points(&self, user_id: &str, points: i64) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET points = points + ?, total_jobs = total_jobs + 1 WHERE id = ?",
        )
        .bind(points)
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to award points: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DeskError::NotFound(format!("User not found: {}", user_id)));
        }

        self.find_by_id(user_id).await
    }
}
