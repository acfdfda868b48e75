//! Configuration management for FacilityDesk
//!
//! Supports dual-location configuration:
//! - User-level: ~/.facilitydesk/facilitydesk.toml
//! - Project-level: ./.facilitydesk/facilitydesk.toml
//!
//! Project-level config overrides user-level config.

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    DatabaseConfig, DeskConfig, LoggingConfig, NotificationConfig, PointsConfig, SlaConfig,
};

use crate::Result;

/// Load configuration from both locations with project config taking precedence
///
/// Priority order:
/// 1. Default values
/// 2. User-level config (~/.facilitydesk/facilitydesk.toml)
/// 3. Project-level config (./.facilitydesk/facilitydesk.toml)
pub async fn load_config() -> Result<DeskConfig> {
    let loader = ConfigLoader::new();
    loader.load().await
}
