//! Ticket model

use crate::error::DeskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Lowercases and folds `_`/`-` into spaces so "in_progress" parses as "In Progress"
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['_', '-'], " ")
}

/// Ticket status enumeration
///
/// Reported → Assigned → In Progress → Completed → Verified → Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Logged and waiting for a worker
    Reported,
    /// Claimed by a worker
    Assigned,
    /// Work has started
    #[serde(rename = "In Progress")]
    InProgress,
    /// Worker finished the job
    Completed,
    /// Reporter confirmed the fix
    Verified,
    /// Closed for good
    Closed,
}

impl TicketStatus {
    /// Statuses that count as an open ticket for duplicate detection
    pub const OPEN: [TicketStatus; 3] = [Self::Reported, Self::Assigned, Self::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "Reported",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Verified => "Verified",
            Self::Closed => "Closed",
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "reported" => Ok(Self::Reported),
            "assigned" => Ok(Self::Assigned),
            "in progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "verified" => Ok(Self::Verified),
            "closed" => Ok(Self::Closed),
            _ => Err(DeskError::Validation(format!("Unknown ticket status: {}", s))),
        }
    }
}

/// Maintenance category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Electrical,
    Plumbing,
    Cleaning,
    Furniture,
    Infrastructure,
    #[serde(rename = "IT")]
    It,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electrical => "Electrical",
            Self::Plumbing => "Plumbing",
            Self::Cleaning => "Cleaning",
            Self::Furniture => "Furniture",
            Self::Infrastructure => "Infrastructure",
            Self::It => "IT",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "electrical" => Ok(Self::Electrical),
            "plumbing" => Ok(Self::Plumbing),
            "cleaning" => Ok(Self::Cleaning),
            "furniture" => Ok(Self::Furniture),
            "infrastructure" => Ok(Self::Infrastructure),
            "it" => Ok(Self::It),
            _ => Err(DeskError::Validation(format!("Unknown category: {}", s))),
        }
    }
}

/// Ticket priority enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Urgent, Self::High, Self::Normal, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            _ => Err(DeskError::Validation(format!("Unknown priority: {}", s))),
        }
    }
}

/// One step of a ticket's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Ticket status after the change
    pub status: TicketStatus,
    pub timestamp: DateTime<Utc>,
    /// User who made the change
    pub updated_by: String,
}

/// Before/after photo references (opaque paths or URLs)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketImages {
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Fields supplied by the reporter when logging a ticket
///
/// Required: title, description, category, block, floor. Blank strings count
/// as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub block: String,
    pub floor: String,
    pub location: Option<String>,
    #[serde(default)]
    pub images: TicketImages,
}

impl NewTicket {
    /// Names of required fields that are missing or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.block.trim().is_empty() {
            missing.push("block");
        }
        if self.floor.trim().is_empty() {
            missing.push("floor");
        }
        missing
    }
}

/// Maintenance ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier (UUID string)
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub block: String,
    pub floor: String,
    /// Specific room or spot
    pub location: Option<String>,
    pub images: TicketImages,
    pub status: TicketStatus,
    /// Reporter; never changes after creation
    pub created_by: String,
    pub assigned_to: Option<String>,
    /// Users who reported the same issue independently
    pub supporters: Vec<String>,
    pub sla_deadline: DateTime<Utc>,
    /// 1-5
    pub rating: Option<u8>,
    pub completion_proof: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Build a freshly reported ticket with its seed history entry
    pub fn reported(
        fields: NewTicket,
        created_by: impl Into<String>,
        sla_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, DeskError> {
        let missing = fields.missing_fields();
        if !missing.is_empty() {
            return Err(DeskError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        let category = fields
            .category
            .ok_or_else(|| DeskError::Validation("Missing required fields: category".to_string()))?;
        let created_by = created_by.into();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            category,
            priority: fields.priority.unwrap_or_default(),
            block: fields.block,
            floor: fields.floor,
            location: fields.location,
            images: fields.images,
            status: TicketStatus::Reported,
            history: vec![HistoryEntry {
                status: TicketStatus::Reported,
                timestamp: now,
                updated_by: created_by.clone(),
            }],
            created_by,
            assigned_to: None,
            supporters: Vec::new(),
            sla_deadline,
            rating: None,
            completion_proof: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Append a history entry for the current status and bump `updated_at`
    pub fn record_history(&mut self, actor: &str, now: DateTime<Utc>) {
        self.history.push(HistoryEntry {
            status: self.status,
            timestamp: now,
            updated_by: actor.to_string(),
        });
        self.updated_at = now;
    }

    /// Add a supporter; returns false if they were already listed
    pub fn add_supporter(&mut self, user_id: &str) -> bool {
        if self.supporters.iter().any(|s| s == user_id) {
            return false;
        }
        self.supporters.push(user_id.to_string());
        true
    }

    /// Timestamp of the first history entry with the given status
    pub fn first_reached(&self, status: TicketStatus) -> Option<DateTime<Utc>> {
        self.history
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.timestamp)
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> NewTicket {
        NewTicket {
            title: "Flickering lights".to_string(),
            description: "Corridor lights flicker".to_string(),
            category: Some(Category::Electrical),
            priority: None,
            block: "A".to_string(),
            floor: "2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reported_ticket_defaults() {
        let now = Utc::now();
        let ticket = Ticket::reported(sample_fields(), "faculty-1", now, now).unwrap();

        assert_eq!(ticket.status, TicketStatus::Reported);
        assert_eq!(ticket.priority, Priority::Normal);
        assert!(ticket.assigned_to.is_none());
        assert_eq!(ticket.history.len(), 1);
        assert_eq!(ticket.history[0].status, TicketStatus::Reported);
        assert_eq!(ticket.history[0].updated_by, "faculty-1");
    }

    #[test]
    fn test_missing_fields() {
        let fields = NewTicket {
            title: "  ".to_string(),
            category: None,
            ..sample_fields()
        };
        assert_eq!(fields.missing_fields(), vec!["title", "category"]);
        assert!(sample_fields().missing_fields().is_empty());

        let now = Utc::now();
        let err = Ticket::reported(fields, "faculty-1", now, now).unwrap_err();
        assert!(err.to_string().contains("title, category"));
    }

    #[test]
    fn test_add_supporter_is_idempotent() {
        let now = Utc::now();
        let mut ticket = Ticket::reported(sample_fields(), "faculty-1", now, now).unwrap();

        assert!(ticket.add_supporter("faculty-2"));
        assert!(!ticket.add_supporter("faculty-2"));
        assert_eq!(ticket.supporters, vec!["faculty-2".to_string()]);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("In Progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert_eq!("closed".parse::<TicketStatus>().unwrap(), TicketStatus::Closed);
        assert!("archived".parse::<TicketStatus>().is_err());
        assert_eq!("it".parse::<Category>().unwrap(), Category::It);
        assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Urgent);
    }

    #[test]
    fn test_status_serializes_with_display_names() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let json = serde_json::to_string(&Category::It).unwrap();
        assert_eq!(json, "\"IT\"");
    }

    #[test]
    fn test_open_statuses() {
        assert!(TicketStatus::Reported.is_open());
        assert!(TicketStatus::InProgress.is_open());
        assert!(!TicketStatus::Completed.is_open());
        assert!(!TicketStatus::Closed.is_open());
    }
}
