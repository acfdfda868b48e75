//! Audit log model

use crate::error::DeskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Audited action tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    TicketCreated,
    JobClaimed,
    JobCompleted,
    TicketRated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicketCreated => "TICKET_CREATED",
            Self::JobClaimed => "JOB_CLAIMED",
            Self::JobCompleted => "JOB_COMPLETED",
            Self::TicketRated => "TICKET_RATED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TICKET_CREATED" => Ok(Self::TicketCreated),
            "JOB_CLAIMED" => Ok(Self::JobClaimed),
            "JOB_COMPLETED" => Ok(Self::JobCompleted),
            "TICKET_RATED" => Ok(Self::TicketRated),
            _ => Err(DeskError::Database(format!("Unknown audit action: {}", s))),
        }
    }
}

/// Audit entry to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditLog {
    pub action: AuditAction,
    pub actor_id: String,
    pub ticket_id: Option<String>,
    pub details: Option<String>,
}

impl NewAuditLog {
    pub fn new(action: AuditAction, actor_id: impl Into<String>) -> Self {
        Self {
            action,
            actor_id: actor_id.into(),
            ticket_id: None,
            details: None,
        }
    }

    /// Builder: Set ticket
    pub fn for_ticket(mut self, ticket_id: impl Into<String>) -> Self {
        self.ticket_id = Some(ticket_id.into());
        self
    }

    /// Builder: Set details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Immutable audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub action: AuditAction,
    pub actor_id: String,
    pub ticket_id: Option<String>,
    /// Free text, empty when not supplied
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn from_new(new: NewAuditLog) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: new.action,
            actor_id: new.actor_id,
            ticket_id: new.ticket_id,
            details: new.details.unwrap_or_default(),
            created_at: super::now(),
        }
    }
}
