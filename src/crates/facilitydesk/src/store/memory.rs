//! In-memory stores for development and testing
//!
//! All state lives behind `parking_lot` locks. Locks are never held across an
//! `.await`, so each trait call is a single critical section, which is what
//! makes `save_guarded` and `award_points` atomic here.

use super::{AuditSink, NotificationSink, TicketQuery, TicketStore, UserDirectory, WriteGuard};
use crate::error::{DeskError, Result};
use crate::models::{AuditLog, NewAuditLog, NewNotification, Notification, Role, Ticket, User};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Ticket store backed by a vector in insertion order
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<Vec<Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets
    pub fn len(&self) -> usize {
        self.tickets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.read().is_empty()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create(&self, ticket: &Ticket) -> Result<String> {
        let mut tickets = self.tickets.write();
        if tickets.iter().any(|t| t.id == ticket.id) {
            return Err(DeskError::Database(format!("Duplicate ticket id: {}", ticket.id)));
        }
        tickets.push(ticket.clone());
        debug!(ticket_id = %ticket.id, "Stored ticket");
        Ok(ticket.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Ticket> {
        self.tickets
            .read()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("Ticket not found: {}", id)))
    }

    async fn find_many(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.read();
        // Newest insertion first so the stable sort breaks timestamp ties the same way
        let mut found: Vec<Ticket> = tickets
            .iter()
            .rev()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn save_guarded(&self, ticket: &Ticket, guard: &WriteGuard) -> Result<bool> {
        let mut tickets = self.tickets.write();
        let Some(stored) = tickets.iter_mut().find(|t| t.id == ticket.id) else {
            return Ok(false);
        };
        if !guard.holds(stored) {
            debug!(ticket_id = %ticket.id, ?guard, "Guarded write rejected");
            return Ok(false);
        }
        let supporters = std::mem::take(&mut stored.supporters);
        *stored = ticket.clone();
        stored.supporters = supporters;
        Ok(true)
    }

    async fn add_supporter(&self, ticket_id: &str, user_id: &str) -> Result<bool> {
        let mut tickets = self.tickets.write();
        let stored = tickets
            .iter_mut()
            .find(|t| t.id == ticket_id)
            .ok_or_else(|| DeskError::NotFound(format!("Ticket not found: {}", ticket_id)))?;
        Ok(stored.add_supporter(user_id))
    }
}

/// User directory keyed by id
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory pre-populated with `users`
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: RwLock::new(map),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &str) -> Result<User> {
        self.users
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("User not found: {}", id)))
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .read()
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.users.write().insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn award_points(&self, user_id: &str, points: i64) -> Result<User> {
        let mut users = self.users.write();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| DeskError::NotFound(format!("User not found: {}", user_id)))?;
        user.points += points;
        user.total_jobs += 1;
        Ok(user.clone())
    }
}

/// Notification sink that keeps everything in a vector
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification in creation order
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.read().clone()
    }

    /// Notifications for one recipient in creation order
    pub fn for_recipient(&self, recipient: &str) -> Vec<Notification> {
        self.notifications
            .read()
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn create(&self, notification: NewNotification) -> Result<Notification> {
        let notification = Notification::from_new(notification);
        self.notifications.write().push(notification.clone());
        Ok(notification)
    }
}

/// Audit sink that keeps everything in a vector
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: RwLock<Vec<AuditLog>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<AuditLog> {
        self.entries.read().clone()
    }

    /// Entries for one ticket in creation order
    pub fn for_ticket(&self, ticket_id: &str) -> Vec<AuditLog> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.ticket_id.as_deref() == Some(ticket_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn create(&self, entry: NewAuditLog) -> Result<AuditLog> {
        let entry = AuditLog::from_new(entry);
        self.entries.write().push(entry.clone());
        Ok(entry)
    }
}
