//! Ticket lifecycle events for observability
//!
//! Every successful lifecycle operation produces one [`TicketEvent`], which the
//! [`EventLogger`] writes through `tracing`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Event types for lifecycle tracking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEvent {
    /// A new ticket was reported
    TicketCreated {
        ticket_id: String,
        actor_id: String,
        priority: String,
        timestamp: i64,
    },
    /// A report was folded into an existing open ticket
    DuplicateMerged {
        ticket_id: String,
        actor_id: String,
        supporter_added: bool,
        timestamp: i64,
    },
    /// A worker claimed a reported ticket
    JobClaimed {
        ticket_id: String,
        worker_id: String,
        timestamp: i64,
    },
    /// The assignee completed a ticket
    JobCompleted {
        ticket_id: String,
        worker_id: String,
        points_awarded: i64,
        timestamp: i64,
    },
    /// Administrative update
    AdminUpdated {
        ticket_id: String,
        actor_id: String,
        status: String,
        assigned_to: Option<String>,
        timestamp: i64,
    },
    /// The creator rated a finished ticket
    TicketRated {
        ticket_id: String,
        actor_id: String,
        rating: u8,
        timestamp: i64,
    },
}

impl TicketEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> i64 {
        match self {
            TicketEvent::TicketCreated { timestamp, .. }
            | TicketEvent::DuplicateMerged { timestamp, .. }
            | TicketEvent::JobClaimed { timestamp, .. }
            | TicketEvent::JobCompleted { timestamp, .. }
            | TicketEvent::AdminUpdated { timestamp, .. }
            | TicketEvent::TicketRated { timestamp, .. } => *timestamp,
        }
    }

    /// Id of the ticket the event is about
    pub fn ticket_id(&self) -> &str {
        match self {
            TicketEvent::TicketCreated { ticket_id, .. }
            | TicketEvent::DuplicateMerged { ticket_id, .. }
            | TicketEvent::JobClaimed { ticket_id, .. }
            | TicketEvent::JobCompleted { ticket_id, .. }
            | TicketEvent::AdminUpdated { ticket_id, .. }
            | TicketEvent::TicketRated { ticket_id, .. } => ticket_id,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            TicketEvent::TicketCreated { ticket_id, priority, .. } => {
                format!("Ticket created: {} ({})", ticket_id, priority)
            }
            TicketEvent::DuplicateMerged { ticket_id, actor_id, supporter_added, .. } => {
                if *supporter_added {
                    format!("Duplicate merged into {}: {} added as supporter", ticket_id, actor_id)
                } else {
                    format!("Duplicate merged into {}: {} already a supporter", ticket_id, actor_id)
                }
            }
            TicketEvent::JobClaimed { ticket_id, worker_id, .. } => {
                format!("Job claimed: {} by {}", ticket_id, worker_id)
            }
            TicketEvent::JobCompleted { ticket_id, worker_id, points_awarded, .. } => {
                format!("Job completed: {} by {} (+{} points)", ticket_id, worker_id, points_awarded)
            }
            TicketEvent::AdminUpdated { ticket_id, status, assigned_to, .. } => match assigned_to {
                Some(assignee) => format!("Admin update: {} -> {} ({})", ticket_id, status, assignee),
                None => format!("Admin update: {} -> {}", ticket_id, status),
            },
            TicketEvent::TicketRated { ticket_id, rating, .. } => {
                format!("Ticket rated: {} ({}/5)", ticket_id, rating)
            }
        }
    }

    /// Create a TicketCreated event
    pub fn ticket_created(
        ticket_id: impl Into<String>,
        actor_id: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        TicketEvent::TicketCreated {
            ticket_id: ticket_id.into(),
            actor_id: actor_id.into(),
            priority: priority.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create a DuplicateMerged event
    pub fn duplicate_merged(
        ticket_id: impl Into<String>,
        actor_id: impl Into<String>,
        supporter_added: bool,
    ) -> Self {
        TicketEvent::DuplicateMerged {
            ticket_id: ticket_id.into(),
            actor_id: actor_id.into(),
            supporter_added,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create a JobClaimed event
    pub fn job_claimed(ticket_id: impl Into<String>, worker_id: impl Into<String>) -> Self {
        TicketEvent::JobClaimed {
            ticket_id: ticket_id.into(),
            worker_id: worker_id.into(),
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create a JobCompleted event
    pub fn job_completed(
        ticket_id: impl Into<String>,
        worker_id: impl Into<String>,
        points_awarded: i64,
    ) -> Self {
        TicketEvent::JobCompleted {
            ticket_id: ticket_id.into(),
            worker_id: worker_id.into(),
            points_awarded,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create an AdminUpdated event
    pub fn admin_updated(
        ticket_id: impl Into<String>,
        actor_id: impl Into<String>,
        status: impl Into<String>,
        assigned_to: Option<String>,
    ) -> Self {
        TicketEvent::AdminUpdated {
            ticket_id: ticket_id.into(),
            actor_id: actor_id.into(),
            status: status.into(),
            assigned_to,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Create a TicketRated event
    pub fn ticket_rated(ticket_id: impl Into<String>, actor_id: impl Into<String>, rating: u8) -> Self {
        TicketEvent::TicketRated {
            ticket_id: ticket_id.into(),
            actor_id: actor_id.into(),
            rating,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Event logger for recording lifecycle events
#[derive(Debug, Clone)]
pub struct EventLogger {
    enabled: bool,
}

impl EventLogger {
    /// Create a new event logger
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Log a lifecycle event
    pub fn log(&self, event: &TicketEvent) {
        if !self.enabled {
            return;
        }

        tracing::info!(
            event_type = ?event,
            ticket_id = event.ticket_id(),
            timestamp = event.timestamp(),
            description = %event.description(),
            "Ticket event"
        );
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_completed_event() {
        let event = TicketEvent::job_completed("t-1", "w-1", 50);

        match &event {
            TicketEvent::JobCompleted { ticket_id, worker_id, points_awarded, .. } => {
                assert_eq!(ticket_id, "t-1");
                assert_eq!(worker_id, "w-1");
                assert_eq!(*points_awarded, 50);
            }
            _ => panic!("Expected JobCompleted event"),
        }

        assert!(event.description().contains("+50 points"));
        assert_eq!(event.ticket_id(), "t-1");
    }

    #[test]
    fn test_duplicate_merged_description() {
        let added = TicketEvent::duplicate_merged("t-1", "f-2", true);
        assert!(added.description().contains("added as supporter"));

        let repeat = TicketEvent::duplicate_merged("t-1", "f-2", false);
        assert!(repeat.description().contains("already a supporter"));
    }

    #[test]
    fn test_admin_updated_description() {
        let event = TicketEvent::admin_updated("t-1", "a-1", "Closed", None);
        assert_eq!(event.description(), "Admin update: t-1 -> Closed");

        let reassigned = TicketEvent::admin_updated("t-1", "a-1", "Assigned", Some("w-2".to_string()));
        assert!(reassigned.description().ends_with("(w-2)"));
    }

    #[test]
    fn test_event_timestamp() {
        let event = TicketEvent::job_claimed("t-1", "w-1");
        let now = Utc::now().timestamp();
        assert!((event.timestamp() - now).abs() <= 1);
    }

    #[test]
    fn test_event_logger() {
        let logger = EventLogger::new(true);
        assert!(logger.is_enabled());
        logger.log(&TicketEvent::ticket_rated("t-1", "f-1", 4));

        let disabled = EventLogger::new(false);
        assert!(!disabled.is_enabled());
        disabled.log(&TicketEvent::ticket_rated("t-1", "f-1", 4));

        assert!(EventLogger::default().is_enabled());
    }

    #[test]
    fn test_event_serialization() {
        let event = TicketEvent::ticket_created("t-1", "f-1", "Urgent");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ticket_created\""));

        let deserialized: TicketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
