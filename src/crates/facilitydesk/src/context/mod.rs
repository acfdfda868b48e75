//! Desk context management
//!
//! Every lifecycle operation receives a [`DeskContext`] holding the store and
//! sink handles it may use; there are no global connections.
//!
//! # Components
//!
//! - **DeskContext** - Store and sink handles plus the SLA and points policies
//! - **ContextBuilder** - Fluent builder for creating contexts

mod desk_context;

pub use desk_context::{ContextBuilder, DeskContext};
