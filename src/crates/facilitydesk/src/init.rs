//! Initialization module for FacilityDesk
//!
//! Handles first-time setup: the home directory and the default
//! configuration file. The database is created and migrated on first use.

use crate::error::{DeskError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration directory name, under the home directory or a project
pub const DESK_DIR: &str = ".facilitydesk";

/// Default configuration file name
pub const CONFIG_FILE: &str = "facilitydesk.toml";

/// Default database file name
pub const DATABASE_FILE: &str = "facilitydesk.db";

const DEFAULT_CONFIG: &str = r#"# FacilityDesk Configuration
#
# This is the user-level configuration file for FacilityDesk.
# Project-specific settings can be placed in ./.facilitydesk/facilitydesk.toml

[database]
# Database file path (relative to ~/.facilitydesk, or absolute)
# Environment variables are expanded: path = "${FACILITYDESK_DB}"
path = "facilitydesk.db"

[logging]
# Log level: "trace", "debug", "info", "warn", "error"
level = "warn"

# Log format: "compact", "pretty"
format = "compact"
colored = true
timestamps = true

# Emit ticket lifecycle events through the logger
events = true

[sla]
# Hours from creation to the SLA deadline, per priority
urgent_hours = 1
high_hours = 4
normal_hours = 24
low_hours = 72

[points]
# Points a worker earns per completed job
urgent = 50
high = 30
default = 10

[notifications]
# Number of notifications shown by `facilitydesk notifications`
recent_limit = 20
"#;

/// Get the FacilityDesk home directory (~/.facilitydesk)
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn desk_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DESK_DIR))
        .ok_or_else(|| DeskError::Config("Could not determine home directory".to_string()))
}

/// Check if FacilityDesk is initialized
pub fn is_initialized() -> bool {
    desk_home()
        .map(|home| home.join(CONFIG_FILE).exists())
        .unwrap_or(false)
}

/// Initialize ~/.facilitydesk with a default configuration
///
/// With `force`, an existing configuration is overwritten.
pub fn initialize(force: bool) -> Result<PathBuf> {
    initialize_at(&desk_home()?, force)
}

/// Initialize a FacilityDesk directory at `home`, returning the config path
pub fn initialize_at(home: &Path, force: bool) -> Result<PathBuf> {
    info!(path = %home.display(), "Initializing FacilityDesk");

    if !home.exists() {
        fs::create_dir_all(home)
            .map_err(|e| DeskError::Config(format!("Failed to create directory: {}", e)))?;
        info!(path = %home.display(), "Created home directory");
    }

    let config_path = home.join(CONFIG_FILE);
    if !config_path.exists() || force {
        fs::write(&config_path, DEFAULT_CONFIG)
            .map_err(|e| DeskError::Config(format!("Failed to write configuration: {}", e)))?;
        info!(path = %config_path.display(), "Created default configuration");
    } else {
        warn!(path = %config_path.display(), "Configuration already exists (use --force to overwrite)");
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeskConfig;
    use tempfile::TempDir;

    #[test]
    fn test_desk_home() {
        let home = desk_home().unwrap();
        assert!(home.ends_with(DESK_DIR));
    }

    #[test]
    fn test_default_config_matches_defaults() {
        let parsed: DeskConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, DeskConfig::default());
    }

    #[test]
    fn test_initialize_at_keeps_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().join(DESK_DIR);

        let config_path = initialize_at(&home, false).unwrap();
        assert!(config_path.exists());

        fs::write(&config_path, "[points]\nurgent = 99\n").unwrap();
        initialize_at(&home, false).unwrap();
        assert!(fs::read_to_string(&config_path).unwrap().contains("99"));

        initialize_at(&home, true).unwrap();
        assert!(fs::read_to_string(&config_path).unwrap().contains("urgent = 50"));
    }
}
