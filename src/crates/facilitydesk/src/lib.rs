//! # FacilityDesk - Facilities Maintenance Ticketing
//!
//! Faculty report maintenance issues, workers claim and resolve them, admins
//! watch the dashboard. This crate holds the ticket lifecycle engine and the
//! stores it runs against.
//!
//! ## Features
//!
//! - **Duplicate Merging** - A second report of an open issue at the same
//!   block, floor and category joins the existing ticket as a supporter
//! - **SLA Deadlines** - Computed from priority at creation
//! - **Guarded Transitions** - Claims and completions are conditional writes,
//!   so two workers cannot both win the same ticket
//! - **Worker Points** - Awarded atomically on completion
//! - **Best-effort Side Effects** - Notification and audit failures are
//!   logged, never propagated
//! - **SQLite or In-Memory Stores** - Behind async store traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use facilitydesk::{
//!     create_ticket, update_ticket, Category, DeskContext, NewTicket, Priority, Role,
//!     TicketStatus, UpdateRequest, User, UserDirectory,
//! };
//!
//! # async fn example() -> facilitydesk::Result<()> {
//! let ctx = DeskContext::in_memory();
//!
//! let faculty = User::new("Fiona", Role::Faculty);
//! let worker = User::new("Xavier", Role::Worker);
//! ctx.users().save(&faculty).await?;
//! ctx.users().save(&worker).await?;
//!
//! let fields = NewTicket {
//!     title: "Sparking socket".to_string(),
//!     description: "Socket near the lab door sparks".to_string(),
//!     category: Some(Category::Electrical),
//!     priority: Some(Priority::Urgent),
//!     block: "A".to_string(),
//!     floor: "2".to_string(),
//!     ..Default::default()
//! };
//! let ticket = create_ticket(&ctx, &faculty.actor(), fields).await?.into_ticket();
//!
//! let claimed = update_ticket(
//!     &ctx,
//!     &worker.actor(),
//!     &ticket.id,
//!     UpdateRequest::status(TicketStatus::Assigned),
//! )
//! .await?;
//! assert_eq!(claimed.status, TicketStatus::Assigned);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod events;
pub mod init;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod services;
pub mod store;
pub mod testing;
pub mod version;

// Error types and utilities
mod error;

// Error types
pub use error::{DeskError, Result};

// Re-export version utilities
pub use version::{full_version as version_info, short_version, VersionInfo};

// Re-export database, config and context types
pub use config::{load_config, ConfigLoader, DeskConfig, LoggingConfig};
pub use context::{ContextBuilder, DeskContext};
pub use db::Database;
pub use policy::{PointsPolicy, SlaPolicy};

// Re-export stores and repositories
pub use repositories::{
    AuditLogRepository, NotificationRepository, TicketRepository, UserRepository,
};
pub use store::{
    AuditSink, InMemoryAuditSink, InMemoryNotificationSink, InMemoryTicketStore,
    InMemoryUserDirectory, NotificationSink, TicketQuery, TicketStore, UserDirectory,
    Visibility, WriteGuard,
};

// Re-export models
pub use models::{
    Actor, AuditAction, AuditLog, Category, HistoryEntry, NewAuditLog, NewNotification,
    NewTicket, Notification, NotificationKind, Priority, Role, Ticket, TicketImages,
    TicketStatus, User,
};

// Re-export lifecycle operations
pub use services::{
    create_ticket, dashboard_stats, get_ticket, list_tickets, rate_ticket, update_ticket,
    CreateOutcome, DashboardStats, ListFilters, Transition, UpdateRequest,
};

// Re-export event types
pub use events::{EventLogger, TicketEvent};
