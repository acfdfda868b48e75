//! Notification repository for database operations

use super::{from_millis, to_millis};
use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::models::{NewNotification, Notification};
use crate::store::NotificationSink;
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

/// Repository for notifications
#[derive(Clone, Debug)]
pub struct NotificationRepository {
    db: Arc<Database>,
}

impl NotificationRepository {
    /// Create a new notification repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Most recent notifications for a recipient, newest first
    pub async fn recent_for_recipient(&self, recipient: &str, limit: usize) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT id, recipient, message, kind, related_id, read, created_at
             FROM notifications
             WHERE recipient = ?
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?",
        )
        .bind(recipient)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to list notifications: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(Notification {
                    id: row.try_get("id")?,
                    recipient: row.try_get("recipient")?,
                    message: row.try_get("message")?,
                    kind: row.try_get::<String, _>("kind")?.parse()?,
                    related_id: row.try_get("related_id")?,
                    read: row.try_get("read")?,
                    created_at: from_millis(row.try_get("created_at")?)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl NotificationSink for NotificationRepository {
    async fn create(&self, notification: NewNotification) -> Result<Notification> {
        let notification = Notification::from_new(notification);

        sqlx::query(
            "INSERT INTO notifications (id, recipient, message, kind, related_id, read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&notification.id)
        .bind(&notification.recipient)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(&notification.related_id)
        .bind(notification.read)
        .bind(to_millis(notification.created_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| DeskError::Sink(format!("Failed to save notification: {}", e)))?;

        Ok(notification)
    }
}
