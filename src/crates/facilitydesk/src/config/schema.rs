//! Configuration schema for FacilityDesk

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main FacilityDesk configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DeskConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// SLA offsets per priority
    #[serde(default)]
    pub sla: SlaConfig,

    /// Points awarded per completed job
    #[serde(default)]
    pub points: PointsConfig,

    /// Notification listing configuration
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database file path (relative to ~/.facilitydesk or absolute)
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "facilitydesk.db".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,

    /// Log format: "compact", "pretty"
    pub format: String,

    /// Enable colored output
    pub colored: bool,

    /// Show timestamps
    pub timestamps: bool,

    /// Emit ticket lifecycle events
    pub events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            colored: true,
            timestamps: true,
            events: true,
        }
    }
}

/// SLA offsets in hours, per ticket priority
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SlaConfig {
    pub urgent_hours: i64,
    pub high_hours: i64,
    pub normal_hours: i64,
    pub low_hours: i64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            urgent_hours: 1,
            high_hours: 4,
            normal_hours: 24,
            low_hours: 72,
        }
    }
}

/// Points credited to a worker per completed job
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PointsConfig {
    pub urgent: i64,
    pub high: i64,
    /// Normal and Low priority
    pub default: i64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            urgent: 50,
            high: 30,
            default: 10,
        }
    }
}

/// Notification listing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationConfig {
    /// How many notifications `recent` listings return
    pub recent_limit: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { recent_limit: 20 }
    }
}

impl DeskConfig {
    /// Merge another config into this one (other takes precedence)
    ///
    /// Sections left at their defaults in `other` do not override this config.
    /// The loader handles priority: defaults → user → project
    pub fn merge(&mut self, other: DeskConfig) {
        if other.database != DatabaseConfig::default() {
            self.database = other.database;
        }
        if other.logging != LoggingConfig::default() {
            self.logging = other.logging;
        }
        if other.sla != SlaConfig::default() {
            self.sla = other.sla;
        }
        if other.points != PointsConfig::default() {
            self.points = other.points;
        }
        if other.notifications != NotificationConfig::default() {
            self.notifications = other.notifications;
        }
    }

    /// Resolve environment variables in configuration values
    ///
    /// Supports ${VAR_NAME} syntax in the database path
    pub fn resolve_env_vars(&mut self) {
        self.database.path = Self::expand_env_var(&self.database.path);
    }

    /// Expand environment variable in a string
    ///
    /// Supports ${VAR_NAME} syntax
    fn expand_env_var(value: &str) -> String {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            std::env::var(var_name).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }

    /// Check values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let sla = [
            self.sla.urgent_hours,
            self.sla.high_hours,
            self.sla.normal_hours,
            self.sla.low_hours,
        ];
        if sla.iter().any(|hours| *hours < 0) {
            return Err(DeskError::Config("SLA hours must not be negative".to_string()));
        }
        if self.notifications.recent_limit == 0 {
            return Err(DeskError::Config(
                "notifications.recent_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the resolved database path
    ///
    /// If path is relative, resolves it relative to ~/.facilitydesk
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = PathBuf::from(&self.database.path);

        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(crate::init::desk_home()?.join(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeskConfig::default();
        assert_eq!(config.database.path, "facilitydesk.db");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.sla.urgent_hours, 1);
        assert_eq!(config.sla.low_hours, 72);
        assert_eq!(config.points.urgent, 50);
        assert_eq!(config.points.default, 10);
        assert_eq!(config.notifications.recent_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_config() {
        let mut base = DeskConfig::default();
        base.database.path = "/srv/desk.db".to_string();

        let mut override_config = DeskConfig::default();
        override_config.points.urgent = 80;

        base.merge(override_config);

        assert_eq!(base.points.urgent, 80);
        assert_eq!(base.database.path, "/srv/desk.db"); // Unchanged
    }

    #[test]
    fn test_partial_section_deserializes() {
        let toml = r#"
            [sla]
            urgent_hours = 2
        "#;

        let config: DeskConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.sla.urgent_hours, 2);
        assert_eq!(config.sla.high_hours, 4);
        assert_eq!(config.points, PointsConfig::default());
    }

    #[test]
    fn test_env_var_expansion() {
        let mut config = DeskConfig::default();
        config.database.path = "${FACILITYDESK_TEST_DB}".to_string();

        std::env::set_var("FACILITYDESK_TEST_DB", "/tmp/from-env.db");
        config.resolve_env_vars();

        assert_eq!(config.database.path, "/tmp/from-env.db");

        std::env::remove_var("FACILITYDESK_TEST_DB");
    }

    #[test]
    fn test_database_path_relative() {
        let config = DeskConfig::default();
        let path = config.database_path().unwrap();

        assert!(path.to_string_lossy().contains(".facilitydesk"));
        assert!(path.to_string_lossy().ends_with("facilitydesk.db"));
    }

    #[test]
    fn test_database_path_absolute() {
        let mut config = DeskConfig::default();
        config.database.path = "/tmp/test.db".to_string();

        let path = config.database_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/test.db"));
    }

    #[test]
    fn test_validate_rejects_negative_sla() {
        let mut config = DeskConfig::default();
        config.sla.high_hours = -1;
        assert!(matches!(config.validate(), Err(DeskError::Config(_))));
    }
}
