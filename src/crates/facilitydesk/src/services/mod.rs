//! Services for business logic
//!
//! - [`lifecycle`] - ticket creation and status transitions
//! - [`view`] - role-scoped ticket listings
//! - [`stats`] - dashboard rollup

pub mod lifecycle;
pub mod stats;
pub mod view;

pub use lifecycle::{
    create_ticket, get_ticket, rate_ticket, update_ticket, CreateOutcome, Transition,
    UpdateRequest,
};
pub use stats::{dashboard_stats, DashboardStats};
pub use view::{list_tickets, ListFilters};
