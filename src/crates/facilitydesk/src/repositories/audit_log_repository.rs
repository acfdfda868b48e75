//! Audit log repository for database operations

use super::{from_millis, to_millis};
use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::models::{AuditLog, NewAuditLog};
use crate::store::AuditSink;
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// Repository for audit log entries
#[derive(Clone, Debug)]
pub struct AuditLogRepository {
    db: Arc<Database>,
}

impl AuditLogRepository {
    /// Create a new audit log repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Audit trail of one ticket, oldest first
    pub async fn list_for_ticket(&self, ticket_id: &str) -> Result<Vec<AuditLog>> {
        let rows = sqlx::query(
            "SELECT id, action, actor_id, ticket_id, details, created_at
             FROM audit_logs
             WHERE ticket_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(ticket_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to list audit logs: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(AuditLog {
                    id: row.try_get("id")?,
                    action: row.try_get::<String, _>("action")?.parse()?,
                    actor_id: row.try_get("actor_id")?,
                    ticket_id: row.try_get("ticket_id")?,
                    details: row.try_get("details")?,
                    created_at: from_millis(row.try_get("created_at")?)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn create(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let entry = AuditLog::from_new(entry);

        sqlx::query(
            "INSERT INTO audit_logs (id, action, actor_id, ticket_id, details, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(entry.action.as_str())
        .bind(&entry.actor_id)
        .bind(&entry.ticket_id)
        .bind(&entry.details)
        .bind(to_millis(entry.created_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| DeskError::Sink(format!("Failed to save audit log: {}", e)))?;

        Ok(entry)
    }
}
