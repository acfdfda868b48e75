//! Build and schema metadata for the `facilitydesk` binary
//!
//! `build.rs` stamps the build number, git commit and build time, and records
//! the newest migration under `migrations/` as the schema version so support
//! requests can tell which database layout a binary expects.

use serde::Serialize;

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CI build number, `0` for local builds
pub const BUILD_NUMBER: &str = env!("BUILD_NUMBER");

/// Short git commit, `unknown` outside a checkout
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// RFC3339 build time
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

/// Timestamp prefix of the newest embedded migration
pub const SCHEMA_VERSION: &str = env!("SCHEMA_VERSION");

/// One-line description used by `facilitydesk version`
///
/// ```
/// let line = facilitydesk::version::full_version();
/// assert!(line.starts_with("FacilityDesk v"));
/// ```
pub fn full_version() -> String {
    VersionInfo::current().to_string()
}

pub fn short_version() -> String {
    format!("v{}", VERSION)
}

/// Metadata of the running binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub build_number: &'static str,
    pub git_commit: &'static str,
    pub build_timestamp: &'static str,
    pub schema_version: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            build_number: BUILD_NUMBER,
            git_commit: GIT_COMMIT,
            build_timestamp: BUILD_TIMESTAMP,
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FacilityDesk v{} (build {}, commit {}, schema {}, built {})",
            self.version, self.build_number, self.git_commit, self.schema_version, self.build_timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_tracks_migrations() {
        // Migration files are named <timestamp>_<description>.sql
        assert_eq!(SCHEMA_VERSION.len(), 14);
        assert!(SCHEMA_VERSION.chars().all(|c| c.is_ascii_digit()));
        assert!(SCHEMA_VERSION >= "20261019000001");
    }

    #[test]
    fn test_full_version_mentions_schema() {
        let line = full_version();
        assert!(line.starts_with(&format!("FacilityDesk v{}", VERSION)));
        assert!(line.contains(&format!("schema {}", SCHEMA_VERSION)));
    }

    #[test]
    fn test_version_info_serializes() {
        let json = serde_json::to_value(VersionInfo::current()).unwrap();
        assert_eq!(json["version"], VERSION);
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
        assert!(!json["git_commit"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_short_version() {
        assert_eq!(short_version(), format!("v{}", VERSION));
    }
}
