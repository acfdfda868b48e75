//! Notification model

use crate::error::DeskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Alert,
    Success,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Alert => "alert",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "alert" => Ok(Self::Alert),
            "success" => Ok(Self::Success),
            _ => Err(DeskError::Database(format!("Unknown notification type: {}", s))),
        }
    }
}

/// Message to be delivered to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub recipient: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Related entity, usually a ticket id
    pub related_id: Option<String>,
}

impl NewNotification {
    pub fn new(recipient: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.into(),
            kind,
            related_id: None,
        }
    }

    /// Builder: Set related entity
    pub fn related_to(mut self, id: impl Into<String>) -> Self {
        self.related_id = Some(id.into());
        self
    }
}

/// Stored notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub related_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialize a new notification as unread
    pub fn from_new(new: NewNotification) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient: new.recipient,
            message: new.message,
            kind: new.kind,
            related_id: new.related_id,
            read: false,
            created_at: super::now(),
        }
    }
}
