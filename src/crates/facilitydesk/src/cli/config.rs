//! Configuration helpers for CLI
//!
//! Loads configuration, opens the database and builds the desk context.

use crate::config::DeskConfig;
use crate::context::DeskContext;
use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::init;
use crate::models::Actor;
use crate::store::UserDirectory;
use std::sync::Arc;
use tracing::info;

/// Everything a CLI handler needs
pub struct CliDesk {
    pub config: DeskConfig,
    pub database: Arc<Database>,
    pub ctx: DeskContext,
}

/// Open the configured database and build a desk context over it
///
/// # Errors
/// Returns error if the database cannot be opened or migrated
pub async fn open_desk(config: DeskConfig) -> Result<CliDesk> {
    let db_path = config.database_path()?;

    info!(path = %db_path.display(), "Initializing database");
    let database = Arc::new(Database::initialize(&db_path).await?);
    let ctx = DeskContext::from_database(database.clone(), &config);

    Ok(CliDesk {
        config,
        database,
        ctx,
    })
}

/// Look up the acting user given with `--as`
pub async fn resolve_actor(desk: &CliDesk, user_id: Option<&str>) -> Result<Actor> {
    let user_id = user_id.ok_or_else(|| {
        DeskError::Validation("This command needs an acting user: pass --as <user-id>".to_string())
    })?;
    let user = desk.ctx.users().find_by_id(user_id).await?;
    Ok(user.actor())
}

/// Check if facilitydesk is initialized
///
/// Returns true if the user configuration file exists
pub fn is_initialized() -> bool {
    init::is_initialized()
}

/// Get initialization instructions
pub fn init_instructions() -> String {
    "FacilityDesk is not initialized. Run 'facilitydesk init' to get started.".to_string()
}
