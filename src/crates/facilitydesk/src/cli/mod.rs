//! CLI command implementations
//!
//! Provides command handlers for the facilitydesk CLI binary. Handlers act as
//! the authorization layer in front of the lifecycle engine: the acting user
//! is looked up from `--as` and passed to the engine as an [`crate::Actor`].

pub mod config;
pub mod notifications;
pub mod stats;
pub mod ticket;
pub mod user;

pub use config::{init_instructions, is_initialized, open_desk, resolve_actor, CliDesk};
