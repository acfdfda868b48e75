//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.facilitydesk/facilitydesk.toml
//! 3. Project-level config: ./.facilitydesk/facilitydesk.toml
//!
//! Later configs override earlier ones.

use crate::config::schema::DeskConfig;
use crate::error::{DeskError, Result};
use crate::init::{CONFIG_FILE, DESK_DIR};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Configuration loader that handles both user and project configs
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    user_config_path: PathBuf,
    project_config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader for the standard locations
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::with_paths(
            home.join(DESK_DIR).join(CONFIG_FILE),
            cwd.join(DESK_DIR).join(CONFIG_FILE),
        )
    }

    /// Create a loader reading from explicit locations
    pub fn with_paths(user_config_path: impl Into<PathBuf>, project_config_path: impl Into<PathBuf>) -> Self {
        Self {
            user_config_path: user_config_path.into(),
            project_config_path: project_config_path.into(),
        }
    }

    /// Load configuration from both locations with project taking precedence
    ///
    /// Missing files are skipped. Files that fail to parse are skipped with a
    /// warning.
    pub async fn load(&self) -> Result<DeskConfig> {
        let mut config = DeskConfig::default();
        debug!("Loading configuration with defaults");

        for (level, path) in [
            ("user", &self.user_config_path),
            ("project", &self.project_config_path),
        ] {
            if !path.exists() {
                debug!(level, path = %path.display(), "Config file not present");
                continue;
            }
            match self.load_from_path(path).await {
                Ok(loaded) => {
                    debug!(level, path = %path.display(), "Loaded config");
                    config.merge(loaded);
                }
                Err(e) => {
                    warn!(level, path = %path.display(), error = %e, "Ignoring unreadable config");
                }
            }
        }

        config.resolve_env_vars();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific path
    pub async fn load_from_path(&self, path: &Path) -> Result<DeskConfig> {
        if !path.exists() {
            return Err(DeskError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DeskError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DeskError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get user config path
    pub fn user_config_path(&self) -> &Path {
        &self.user_config_path
    }

    /// Get project config path
    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }

    /// Check if user config exists
    pub fn user_config_exists(&self) -> bool {
        self.user_config_path.exists()
    }

    /// Check if project config exists
    pub fn project_config_exists(&self) -> bool {
        self.project_config_path.exists()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths() {
        let loader = ConfigLoader::new();
        assert!(loader.user_config_path().ends_with(".facilitydesk/facilitydesk.toml"));
        assert!(loader.project_config_path().ends_with(".facilitydesk/facilitydesk.toml"));
    }

    #[tokio::test]
    async fn test_load_returns_defaults_when_no_files() {
        let loader = ConfigLoader::with_paths("/nonexistent/user.toml", "/nonexistent/project.toml");
        let config = loader.load().await.unwrap();
        assert_eq!(config, DeskConfig::default());
    }

    #[tokio::test]
    async fn test_project_overrides_user() {
        let temp_dir = TempDir::new().unwrap();
        let user_path = temp_dir.path().join("user.toml");
        let project_path = temp_dir.path().join("project.toml");

        fs::write(
            &user_path,
            r#"
[database]
path = "/srv/user.db"

[points]
urgent = 70
high = 30
default = 10
"#,
        )
        .await
        .unwrap();
        fs::write(
            &project_path,
            r#"
[points]
urgent = 90
"#,
        )
        .await
        .unwrap();

        let config = ConfigLoader::with_paths(&user_path, &project_path)
            .load()
            .await
            .unwrap();

        assert_eq!(config.points.urgent, 90);
        assert_eq!(config.database.path, "/srv/user.db");
        assert_eq!(config.logging.level, "warn");
    }

    #[tokio::test]
    async fn test_invalid_toml_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let user_path = temp_dir.path().join("user.toml");
        fs::write(&user_path, "[sla\nurgent_hours = 3\n").await.unwrap();

        let config = ConfigLoader::with_paths(&user_path, "/nonexistent/project.toml")
            .load()
            .await
            .unwrap();
        assert_eq!(config.sla.urgent_hours, 1);
    }

    #[tokio::test]
    async fn test_load_from_path_reports_type_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.toml");
        fs::write(&path, "[sla]\nurgent_hours = \"soon\"\n").await.unwrap();

        let err = ConfigLoader::new().load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.toml");
        fs::write(&path, "[notifications]\nrecent_limit = 0\n").await.unwrap();

        let result = ConfigLoader::with_paths("/nonexistent/user.toml", &path).load().await;
        assert!(matches!(result, Err(DeskError::Config(_))));
    }

    #[tokio::test]
    async fn test_env_var_in_database_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.toml");
        fs::write(&path, "[database]\npath = \"${FACILITYDESK_LOADER_DB}\"\n")
            .await
            .unwrap();

        std::env::set_var("FACILITYDESK_LOADER_DB", "/var/lib/desk.db");
        let config = ConfigLoader::with_paths("/nonexistent/user.toml", &path)
            .load()
            .await
            .unwrap();
        std::env::remove_var("FACILITYDESK_LOADER_DB");

        assert_eq!(config.database.path, "/var/lib/desk.db");
    }
}
