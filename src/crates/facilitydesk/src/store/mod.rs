//! Storage and sink contracts
//!
//! The lifecycle engine only talks to these traits. Two implementations ship
//! with the crate:
//!
//! - [`memory`] - lock-protected in-memory stores for tests and embedding
//! - [`crate::repositories`] - SQLite repositories backed by [`crate::db::Database`]
//!
//! Every implementation must make [`TicketStore::save_guarded`] and
//! [`UserDirectory::award_points`] atomic with respect to the single document
//! they touch. Those two calls are what keep concurrent claims and point
//! awards from losing updates.

pub mod memory;

use crate::error::Result;
use crate::models::{
    AuditLog, Category, NewAuditLog, NewNotification, Notification, Priority, Role, Ticket,
    TicketStatus, User,
};
use async_trait::async_trait;

pub use memory::{InMemoryAuditSink, InMemoryNotificationSink, InMemoryTicketStore, InMemoryUserDirectory};

/// Which tickets a query may see at all
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    /// No restriction
    #[default]
    All,
    /// Tickets created by this user
    CreatedBy(String),
    /// Reported tickets plus tickets assigned to this user
    OpenPoolOrAssignedTo(String),
}

impl Visibility {
    pub fn allows(&self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::CreatedBy(user) => &ticket.created_by == user,
            Self::OpenPoolOrAssignedTo(user) => {
                ticket.status == TicketStatus::Reported
                    || ticket.assigned_to.as_deref() == Some(user.as_str())
            }
        }
    }
}

/// Predicate over ticket attributes
///
/// All present conditions must hold. Results come back newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub visibility: Visibility,
    /// Status must be one of these
    pub statuses: Option<Vec<TicketStatus>>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub block: Option<String>,
    pub floor: Option<String>,
    pub limit: Option<usize>,
}

impl TicketQuery {
    /// Query matching every ticket
    pub fn all() -> Self {
        Self::default()
    }

    /// Open tickets at the same spot and category
    pub fn open_duplicates_of(block: &str, floor: &str, category: Category) -> Self {
        Self {
            statuses: Some(TicketStatus::OPEN.to_vec()),
            category: Some(category),
            block: Some(block.to_string()),
            floor: Some(floor.to_string()),
            ..Self::default()
        }
    }

    /// Builder: Set visibility
    pub fn visible_to(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder: Require a single status
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.statuses = Some(vec![status]);
        self
    }

    /// Builder: Cap the number of results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.visibility.allows(ticket)
            && self
                .statuses
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&ticket.status))
            && self.category.map_or(true, |c| ticket.category == c)
            && self.priority.map_or(true, |p| ticket.priority == p)
            && self.block.as_ref().map_or(true, |b| &ticket.block == b)
            && self.floor.as_ref().map_or(true, |f| &ticket.floor == f)
    }
}

/// Condition a guarded write checks against the stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteGuard {
    /// Unconditional write
    None,
    /// Stored status must still equal this
    StatusIs(TicketStatus),
    /// Stored assignee must still equal this user
    AssignedTo(String),
    /// Stored history length must still equal this. Every status mutation
    /// appends one history entry, so the length works as a revision number.
    Revision(usize),
}

impl WriteGuard {
    pub fn holds(&self, stored: &Ticket) -> bool {
        match self {
            Self::None => true,
            Self::StatusIs(status) => stored.status == *status,
            Self::AssignedTo(user) => stored.assigned_to.as_deref() == Some(user.as_str()),
            Self::Revision(len) => stored.history.len() == *len,
        }
    }
}

/// Persistence for ticket documents
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket, returning its id
    async fn create(&self, ticket: &Ticket) -> Result<String>;

    /// Load a ticket; `NotFound` if absent
    async fn find_by_id(&self, id: &str) -> Result<Ticket>;

    /// Most recently created ticket matching the query
    async fn find_one(&self, query: &TicketQuery) -> Result<Option<Ticket>> {
        let mut found = self.find_many(&query.clone().limit(1)).await?;
        Ok(found.pop())
    }

    /// All matching tickets, newest first
    async fn find_many(&self, query: &TicketQuery) -> Result<Vec<Ticket>>;

    /// Write the ticket only if `guard` holds for the stored copy.
    ///
    /// Returns false, writing nothing, when the guard fails. The check and
    /// the write happen as one step. The stored supporter set is kept as is;
    /// only [`TicketStore::add_supporter`] changes it.
    async fn save_guarded(&self, ticket: &Ticket, guard: &WriteGuard) -> Result<bool>;

    /// Append `user_id` to the ticket's supporters unless already listed
    ///
    /// Atomic with respect to the stored ticket. Returns whether the user was
    /// added; `NotFound` if the ticket does not exist.
    async fn add_supporter(&self, ticket_id: &str, user_id: &str) -> Result<bool>;

    /// Persist in-place mutations unconditionally
    async fn save(&self, ticket: &Ticket) -> Result<()> {
        if self.save_guarded(ticket, &WriteGuard::None).await? {
            Ok(())
        } else {
            Err(crate::error::DeskError::NotFound(format!("Ticket not found: {}", ticket.id)))
        }
    }
}

/// Read/write access to users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Load a user; `NotFound` if absent
    async fn find_by_id(&self, id: &str) -> Result<User>;

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>>;

    /// Insert or replace a user
    async fn save(&self, user: &User) -> Result<()>;

    /// Atomically add `points` and one completed job, returning the updated user
    async fn award_points(&self, user_id: &str, points: i64) -> Result<User>;
}

/// Append-only notification sink
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification>;
}

/// Append-only audit sink
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn create(&self, entry: NewAuditLog) -> Result<AuditLog>;
}
