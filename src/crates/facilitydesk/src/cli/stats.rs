//! Dashboard stats command handler

use crate::cli::CliDesk;
use crate::error::{DeskError, Result};
use crate::models::{Actor, Role};
use crate::services::dashboard_stats;
use colored::Colorize;

/// Handle stats command (admins only)
pub async fn handle_stats(desk: &CliDesk, actor: &Actor, json: bool) -> Result<()> {
    if actor.role != Role::Admin {
        return Err(DeskError::Unauthorized(
            "Dashboard stats are only available to admins".to_string(),
        ));
    }

    let stats = dashboard_stats(&desk.ctx).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Dashboard".bold());
    println!("  Total tickets:   {}", stats.total_tickets);
    println!("  Pending:         {}", stats.pending_tickets);
    println!("  Urgent:          {}", stats.urgent_tickets.to_string().red());
    println!("  Completed:       {}", stats.completed_count);
    println!("  Avg completion:  {:.1}h", stats.avg_completion_hours);

    Ok(())
}
