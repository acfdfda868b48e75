//! SLA and points tables
//!
//! Both are looked up by ticket priority and built from [`crate::config`].

use crate::config::{PointsConfig, SlaConfig};
use crate::models::Priority;
use chrono::{DateTime, Duration, Utc};

/// Hours from creation to the SLA deadline, per priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaPolicy {
    urgent_hours: i64,
    high_hours: i64,
    normal_hours: i64,
    low_hours: i64,
}

impl SlaPolicy {
    pub fn hours_for(&self, priority: Priority) -> i64 {
        match priority {
            Priority::Urgent => self.urgent_hours,
            Priority::High => self.high_hours,
            Priority::Normal => self.normal_hours,
            Priority::Low => self.low_hours,
        }
    }

    /// Deadline for a ticket of `priority` created at `created_at`
    pub fn deadline_for(&self, priority: Priority, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::hours(self.hours_for(priority))
    }
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self::from(&SlaConfig::default())
    }
}

impl From<&SlaConfig> for SlaPolicy {
    fn from(config: &SlaConfig) -> Self {
        Self {
            urgent_hours: config.urgent_hours,
            high_hours: config.high_hours,
            normal_hours: config.normal_hours,
            low_hours: config.low_hours,
        }
    }
}

/// Points credited to the worker who completes a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsPolicy {
    urgent: i64,
    high: i64,
    default: i64,
}

impl PointsPolicy {
    pub fn points_for(&self, priority: Priority) -> i64 {
        match priority {
            Priority::Urgent => self.urgent,
            Priority::High => self.high,
            Priority::Normal | Priority::Low => self.default,
        }
    }
}

impl Default for PointsPolicy {
    fn default() -> Self {
        Self::from(&PointsConfig::default())
    }
}

impl From<&PointsConfig> for PointsPolicy {
    fn from(config: &PointsConfig) -> Self {
        Self {
            urgent: config.urgent,
            high: config.high,
            default: config.default,
        }
    }
}
