//! Role-scoped ticket listings

use crate::context::DeskContext;
use crate::error::Result;
use crate::models::{Actor, Category, Priority, Role, Ticket, TicketStatus};
use crate::store::{TicketQuery, Visibility};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Optional equality filters supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    pub status: Option<TicketStatus>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

/// Base visibility for a role
///
/// Faculty see what they reported, workers see the open pool plus their own
/// jobs, admins see everything.
pub fn visibility_for(actor: &Actor) -> Visibility {
    match actor.role {
        Role::Faculty => Visibility::CreatedBy(actor.id.clone()),
        Role::Worker => Visibility::OpenPoolOrAssignedTo(actor.id.clone()),
        Role::Admin => Visibility::All,
    }
}

/// Tickets visible to `actor` that match `filters`, newest first
///
/// Filters narrow the role's base visibility and can never widen it.
pub async fn list_tickets(ctx: &DeskContext, actor: &Actor, filters: &ListFilters) -> Result<Vec<Ticket>> {
    let query = TicketQuery {
        visibility: visibility_for(actor),
        statuses: filters.status.map(|status| vec![status]),
        category: filters.category,
        priority: filters.priority,
        ..TicketQuery::default()
    };

    let tickets = ctx.tickets().find_many(&query).await?;
    debug!(actor = %actor.id, role = %actor.role, count = tickets.len(), "Listed tickets");
    Ok(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_by_role() {
        let faculty = Actor::new("f1", "Fay", Role::Faculty);
        let worker = Actor::new("w1", "Wes", Role::Worker);
        let admin = Actor::new("a1", "Ada", Role::Admin);

        assert_eq!(visibility_for(&faculty), Visibility::CreatedBy("f1".to_string()));
        assert_eq!(
            visibility_for(&worker),
            Visibility::OpenPoolOrAssignedTo("w1".to_string())
        );
        assert_eq!(visibility_for(&admin), Visibility::All);
    }
}
