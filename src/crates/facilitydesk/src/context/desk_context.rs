//! Context shared by all lifecycle operations

use crate::config::DeskConfig;
use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::events::EventLogger;
use crate::policy::{PointsPolicy, SlaPolicy};
use crate::repositories::{
    AuditLogRepository, NotificationRepository, TicketRepository, UserRepository,
};
use crate::store::{
    AuditSink, InMemoryAuditSink, InMemoryNotificationSink, InMemoryTicketStore,
    InMemoryUserDirectory, NotificationSink, TicketStore, UserDirectory,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Store and sink handles for the lifecycle engine
#[derive(Clone)]
pub struct DeskContext {
    tickets: Arc<dyn TicketStore>,
    users: Arc<dyn UserDirectory>,
    notifications: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
    sla: SlaPolicy,
    points: PointsPolicy,
    event_logger: EventLogger,
}

impl DeskContext {
    /// Context over fresh in-memory stores with default policies
    pub fn in_memory() -> Self {
        Self {
            tickets: Arc::new(InMemoryTicketStore::new()),
            users: Arc::new(InMemoryUserDirectory::new()),
            notifications: Arc::new(InMemoryNotificationSink::new()),
            audit: Arc::new(InMemoryAuditSink::new()),
            sla: SlaPolicy::default(),
            points: PointsPolicy::default(),
            event_logger: EventLogger::default(),
        }
    }

    /// Context over the SQLite repositories of `database`
    pub fn from_database(database: Arc<Database>, config: &DeskConfig) -> Self {
        debug!("Creating desk context over SQLite repositories");
        Self {
            tickets: Arc::new(TicketRepository::new(database.clone())),
            users: Arc::new(UserRepository::new(database.clone())),
            notifications: Arc::new(NotificationRepository::new(database.clone())),
            audit: Arc::new(AuditLogRepository::new(database)),
            sla: SlaPolicy::from(&config.sla),
            points: PointsPolicy::from(&config.points),
            event_logger: EventLogger::new(config.logging.events),
        }
    }

    /// Get ticket store
    pub fn tickets(&self) -> &Arc<dyn TicketStore> {
        &self.tickets
    }

    /// Get user directory
    pub fn users(&self) -> &Arc<dyn UserDirectory> {
        &self.users
    }

    /// Get notification sink
    pub fn notifications(&self) -> &Arc<dyn NotificationSink> {
        &self.notifications
    }

    /// Get audit sink
    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    /// Get SLA policy
    pub fn sla(&self) -> &SlaPolicy {
        &self.sla
    }

    /// Get points policy
    pub fn points(&self) -> &PointsPolicy {
        &self.points
    }

    /// Get event logger
    pub fn event_logger(&self) -> &EventLogger {
        &self.event_logger
    }
}

impl fmt::Debug for DeskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeskContext")
            .field("sla", &self.sla)
            .field("points", &self.points)
            .field("event_logger", &self.event_logger)
            .finish_non_exhaustive()
    }
}

/// Builder for creating desk contexts
#[derive(Default)]
pub struct ContextBuilder {
    tickets: Option<Arc<dyn TicketStore>>,
    users: Option<Arc<dyn UserDirectory>>,
    notifications: Option<Arc<dyn NotificationSink>>,
    audit: Option<Arc<dyn AuditSink>>,
    sla: Option<SlaPolicy>,
    points: Option<PointsPolicy>,
    event_logger: Option<EventLogger>,
}

impl ContextBuilder {
    /// Create a new context builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ticket store
    pub fn with_ticket_store(mut self, tickets: Arc<dyn TicketStore>) -> Self {
        self.tickets = Some(tickets);
        self
    }

    /// Set user directory
    pub fn with_user_directory(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    /// Set notification sink
    pub fn with_notification_sink(mut self, notifications: Arc<dyn NotificationSink>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Set audit sink
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Take policies and event logging from configuration
    pub fn with_config(mut self, config: &DeskConfig) -> Self {
        self.sla = Some(SlaPolicy::from(&config.sla));
        self.points = Some(PointsPolicy::from(&config.points));
        self.event_logger = Some(EventLogger::new(config.logging.events));
        self
    }

    /// Set SLA policy
    pub fn with_sla_policy(mut self, sla: SlaPolicy) -> Self {
        self.sla = Some(sla);
        self
    }

    /// Set points policy
    pub fn with_points_policy(mut self, points: PointsPolicy) -> Self {
        self.points = Some(points);
        self
    }

    /// Set event logger
    pub fn with_event_logger(mut self, event_logger: EventLogger) -> Self {
        self.event_logger = Some(event_logger);
        self
    }

    /// Build the desk context
    ///
    /// # Errors
    /// Returns a `Config` error if a store or sink is missing. Policies
    /// default when unset.
    pub fn build(self) -> Result<DeskContext> {
        let tickets = self
            .tickets
            .ok_or_else(|| DeskError::Config("Ticket store is required for desk context".to_string()))?;
        let users = self
            .users
            .ok_or_else(|| DeskError::Config("User directory is required for desk context".to_string()))?;
        let notifications = self.notifications.ok_or_else(|| {
            DeskError::Config("Notification sink is required for desk context".to_string())
        })?;
        let audit = self
            .audit
            .ok_or_else(|| DeskError::Config("Audit sink is required for desk context".to_string()))?;

        Ok(DeskContext {
            tickets,
            users,
            notifications,
            audit,
            sla: self.sla.unwrap_or_default(),
            points: self.points.unwrap_or_default(),
            event_logger: self.event_logger.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn test_context_builder_missing_store() {
        let result = ContextBuilder::new()
            .with_user_directory(Arc::new(InMemoryUserDirectory::new()))
            .with_notification_sink(Arc::new(InMemoryNotificationSink::new()))
            .with_audit_sink(Arc::new(InMemoryAuditSink::new()))
            .build();

        let err = result.unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
        assert!(err.to_string().contains("Ticket store is required"));
    }

    #[test]
    fn test_context_builder_uses_config_policies() {
        let mut config = DeskConfig::default();
        config.points.urgent = 75;
        config.logging.events = false;

        let ctx = ContextBuilder::new()
            .with_ticket_store(Arc::new(InMemoryTicketStore::new()))
            .with_user_directory(Arc::new(InMemoryUserDirectory::new()))
            .with_notification_sink(Arc::new(InMemoryNotificationSink::new()))
            .with_audit_sink(Arc::new(InMemoryAuditSink::new()))
            .with_config(&config)
            .build()
            .unwrap();

        assert_eq!(ctx.points().points_for(Priority::Urgent), 75);
        assert_eq!(ctx.sla().hours_for(Priority::Low), 72);
        assert!(!ctx.event_logger().is_enabled());
    }

    #[tokio::test]
    async fn test_from_database_context() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let ctx = DeskContext::from_database(db, &DeskConfig::default());

        let users = ctx.users().find_by_role(crate::models::Role::Worker).await.unwrap();
        assert!(users.is_empty());
        assert!(format!("{:?}", ctx).starts_with("DeskContext"));
    }
}
