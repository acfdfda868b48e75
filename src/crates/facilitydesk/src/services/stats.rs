//! Dashboard rollup over all tickets

use crate::context::DeskContext;
use crate::error::Result;
use crate::models::{Priority, Ticket, TicketStatus};
use crate::store::TicketQuery;
use serde::{Deserialize, Serialize};

/// Aggregate ticket counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_tickets: usize,
    /// Tickets not yet Closed
    pub pending_tickets: usize,
    pub urgent_tickets: usize,
    /// Completed tickets with a Completed history entry
    pub completed_count: usize,
    /// Mean hours from creation to first completion, one decimal
    pub avg_completion_hours: f64,
}

impl DashboardStats {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut stats = Self {
            total_tickets: tickets.len(),
            ..Self::default()
        };

        let mut total_ms: i64 = 0;
        for ticket in tickets {
            if ticket.status != TicketStatus::Closed {
                stats.pending_tickets += 1;
            }
            if ticket.priority == Priority::Urgent {
                stats.urgent_tickets += 1;
            }
            if ticket.status == TicketStatus::Completed {
                if let Some(completed_at) = ticket.first_reached(TicketStatus::Completed) {
                    total_ms += (completed_at - ticket.created_at).num_milliseconds();
                    stats.completed_count += 1;
                }
            }
        }

        if stats.completed_count > 0 {
            let hours = total_ms as f64 / stats.completed_count as f64 / 3_600_000.0;
            stats.avg_completion_hours = (hours * 10.0).round() / 10.0;
        }
        stats
    }
}

/// Compute dashboard stats over every stored ticket
pub async fn dashboard_stats(ctx: &DeskContext) -> Result<DashboardStats> {
    let tickets = ctx.tickets().find_many(&TicketQuery::all()).await?;
    Ok(DashboardStats::from_tickets(&tickets))
}
