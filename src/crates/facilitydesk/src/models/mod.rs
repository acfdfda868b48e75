//! Domain models for FacilityDesk
//!
//! Defines tickets, users, notifications and audit log entries.

pub mod audit_log;
pub mod notification;
pub mod ticket;
pub mod user;

pub use audit_log::{AuditAction, AuditLog, NewAuditLog};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use ticket::{Category, HistoryEntry, NewTicket, Priority, Ticket, TicketImages, TicketStatus};
pub use user::{Actor, Role, User};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time truncated to milliseconds, the precision the SQLite stores keep
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
