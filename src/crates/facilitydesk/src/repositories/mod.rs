//! Database repositories
//!
//! SQLite implementations of the store and sink contracts in [`crate::store`].
//! Timestamps are stored as Unix milliseconds; history and supporters as JSON.

pub mod audit_log_repository;
pub mod notification_repository;
pub mod ticket_repository;
pub mod user_repository;

// Re-exports
pub use audit_log_repository::AuditLogRepository;
pub use notification_repository::NotificationRepository;
pub use ticket_repository::TicketRepository;
pub use user_repository::UserRepository;

use crate::error::{DeskError, Result};
use chrono::{DateTime, TimeZone, Utc};

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| DeskError::Database(format!("Invalid timestamp: {}", ms)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_preserve_precision() {
        let now = Utc::now();
        let restored = from_millis(to_millis(now)).unwrap();
        assert_eq!(restored.timestamp_millis(), now.timestamp_millis());
    }
}
