//! Test infrastructure and helpers for the facilitydesk crate
//!
//! Provides a seeded in-memory desk, ticket fixtures and a sink that always
//! fails. Used by the unit tests and by the integration tests under `tests/`.

use crate::context::{ContextBuilder, DeskContext};
use crate::error::{DeskError, Result};
use crate::models::{
    Actor, AuditLog, Category, NewAuditLog, NewNotification, NewTicket, Notification, Priority,
    Role, Ticket, User,
};
use crate::services::lifecycle::create_ticket;
use crate::store::{
    AuditSink, InMemoryAuditSink, InMemoryNotificationSink, InMemoryTicketStore,
    InMemoryUserDirectory, NotificationSink, UserDirectory,
};
use async_trait::async_trait;
use std::sync::Arc;

/// In-memory desk with two faculty members, two workers and an admin
///
/// The concrete stores are kept next to the context so tests can inspect
/// what the engine wrote.
pub struct TestDesk {
    pub ctx: DeskContext,
    pub tickets: Arc<InMemoryTicketStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub notifications: Arc<InMemoryNotificationSink>,
    pub audit: Arc<InMemoryAuditSink>,
    pub faculty: Actor,
    pub faculty_b: Actor,
    pub worker_x: Actor,
    pub worker_y: Actor,
    pub admin: Actor,
}

impl TestDesk {
    /// Seeded desk with working sinks
    pub fn seeded() -> Self {
        Self::build(None)
    }

    /// Seeded desk whose notification and audit sinks always fail
    pub fn with_failing_sinks() -> Self {
        Self::build(Some(Arc::new(FailingSink)))
    }

    fn build(failing: Option<Arc<FailingSink>>) -> Self {
        let faculty = User::new("Fiona Faculty", Role::Faculty).with_id("faculty-1");
        let faculty_b = User::new("Felix Faculty", Role::Faculty).with_id("faculty-2");
        let worker_x = User::new("Xavier Worker", Role::Worker).with_id("worker-x");
        let worker_y = User::new("Yara Worker", Role::Worker).with_id("worker-y");
        let admin = User::new("Ada Admin", Role::Admin).with_id("admin-1");

        let actors = [&faculty, &faculty_b, &worker_x, &worker_y, &admin].map(User::actor);

        let tickets = Arc::new(InMemoryTicketStore::new());
        let users = Arc::new(InMemoryUserDirectory::with_users([
            faculty, faculty_b, worker_x, worker_y, admin,
        ]));
        let notifications = Arc::new(InMemoryNotificationSink::new());
        let audit = Arc::new(InMemoryAuditSink::new());

        let builder = ContextBuilder::new()
            .with_ticket_store(tickets.clone())
            .with_user_directory(users.clone());
        let builder = match failing {
            Some(sink) => builder
                .with_notification_sink(sink.clone())
                .with_audit_sink(sink),
            None => builder
                .with_notification_sink(notifications.clone())
                .with_audit_sink(audit.clone()),
        };
        let ctx = match builder.build() {
            Ok(ctx) => ctx,
            Err(e) => panic!("test desk context: {}", e),
        };

        let [faculty, faculty_b, worker_x, worker_y, admin] = actors;
        Self {
            ctx,
            tickets,
            users,
            notifications,
            audit,
            faculty,
            faculty_b,
            worker_x,
            worker_y,
            admin,
        }
    }

    /// Current state of a seeded user
    pub async fn user(&self, id: &str) -> User {
        match self.users.find_by_id(id).await {
            Ok(user) => user,
            Err(e) => panic!("unknown test user {}: {}", id, e),
        }
    }

    /// Report a fresh ticket as `faculty` at a location no other fixture uses
    pub async fn reported_ticket(&self, priority: Priority) -> Ticket {
        let block = format!("T{}", self.tickets.len());
        let fields = sample_ticket(&block, "1", Category::Infrastructure, priority);
        match create_ticket(&self.ctx, &self.faculty, fields).await {
            Ok(outcome) => outcome.into_ticket(),
            Err(e) => panic!("fixture ticket: {}", e),
        }
    }
}

/// Valid creation fields for a ticket at `block`/`floor`
pub fn sample_ticket(block: &str, floor: &str, category: Category, priority: Priority) -> NewTicket {
    NewTicket {
        title: format!("{} issue in block {}", category, block),
        description: format!("Reported on floor {}", floor),
        category: Some(category),
        priority: Some(priority),
        block: block.to_string(),
        floor: floor.to_string(),
        location: Some("Room 101".to_string()),
        ..Default::default()
    }
}

/// Notification and audit sink that rejects every write
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn create(&self, _notification: NewNotification) -> Result<Notification> {
        Err(DeskError::Sink("notification sink unavailable".to_string()))
    }
}

#[async_trait]
impl AuditSink for FailingSink {
    async fn create(&self, _entry: NewAuditLog) -> Result<AuditLog> {
        Err(DeskError::Sink("audit sink unavailable".to_string()))
    }
}
