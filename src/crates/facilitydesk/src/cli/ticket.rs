//! Ticket command handlers

use crate::cli::CliDesk;
use crate::error::Result;
use crate::models::{Actor, NewTicket, Priority, Ticket, TicketImages, TicketStatus};
use crate::repositories::AuditLogRepository;
use crate::services::{
    create_ticket, get_ticket, list_tickets, rate_ticket, update_ticket, CreateOutcome,
    ListFilters, UpdateRequest,
};
use colored::{ColoredString, Colorize};
use tabled::{Table, Tabled};

/// Ticket display row for table output
#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "SLA")]
    sla: String,
}

/// Fields of the ticket create command
pub struct CreateArgs {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Option<String>,
    pub block: String,
    pub floor: String,
    pub location: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
}

fn status_label(status: TicketStatus) -> ColoredString {
    match status {
        TicketStatus::Reported => status.as_str().yellow(),
        TicketStatus::Assigned | TicketStatus::InProgress => status.as_str().cyan(),
        TicketStatus::Completed | TicketStatus::Verified => status.as_str().green(),
        TicketStatus::Closed => status.as_str().dimmed(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn print_summary(ticket: &Ticket) {
    println!("  ID: {}", ticket.id);
    println!("  Title: {}", ticket.title);
    println!("  Status: {}", status_label(ticket.status));
    println!("  Priority: {}", ticket.priority);
    if let Some(assignee) = &ticket.assigned_to {
        println!("  Assigned to: {}", assignee);
    }
}

/// Handle ticket create command
pub async fn handle_create(desk: &CliDesk, actor: &Actor, args: CreateArgs) -> Result<()> {
    let priority = args.priority.as_deref().map(str::parse::<Priority>).transpose()?;
    let fields = NewTicket {
        title: args.title,
        description: args.description,
        category: Some(args.category.parse()?),
        priority,
        block: args.block,
        floor: args.floor,
        location: args.location,
        images: TicketImages {
            before: args.before_image,
            after: args.after_image,
        },
    };

    match create_ticket(&desk.ctx, actor, fields).await? {
        CreateOutcome::Created(ticket) => {
            println!("{}", "✓ Ticket created".green().bold());
            print_summary(&ticket);
            println!(
                "  SLA deadline: {}",
                ticket.sla_deadline.format("%Y-%m-%d %H:%M UTC")
            );
        }
        CreateOutcome::Duplicate(ticket) => {
            println!(
                "{}",
                "Duplicate ticket detected. You have been added as a supporter.".yellow().bold()
            );
            print_summary(&ticket);
            println!("  Supporters: {}", ticket.supporters.len());
        }
    }

    Ok(())
}

/// Handle ticket list command
pub async fn handle_list(
    desk: &CliDesk,
    actor: &Actor,
    status: Option<String>,
    category: Option<String>,
    priority: Option<String>,
) -> Result<()> {
    let filters = ListFilters {
        status: status.as_deref().map(str::parse).transpose()?,
        category: category.as_deref().map(str::parse).transpose()?,
        priority: priority.as_deref().map(str::parse).transpose()?,
    };

    let tickets = list_tickets(&desk.ctx, actor, &filters).await?;

    if tickets.is_empty() {
        println!("{}", "No tickets found".yellow());
        return Ok(());
    }

    let rows: Vec<TicketRow> = tickets
        .into_iter()
        .map(|ticket| TicketRow {
            title: truncate(&ticket.title, 40),
            category: ticket.category.to_string(),
            priority: ticket.priority.to_string(),
            status: ticket.status.to_string(),
            location: format!("{}/{}", ticket.block, ticket.floor),
            assignee: ticket.assigned_to.unwrap_or_else(|| "-".to_string()),
            sla: ticket.sla_deadline.format("%m-%d %H:%M").to_string(),
            id: ticket.id,
        })
        .collect();

    let count = rows.len();
    println!("{}", Table::new(rows));
    println!("\nTotal: {} tickets", count);

    Ok(())
}

/// Handle ticket show command
pub async fn handle_show(desk: &CliDesk, id: String) -> Result<()> {
    let ticket = get_ticket(&desk.ctx, &id).await?;

    println!("{}", format!("Ticket {}", ticket.id).bold());
    println!("  Title: {}", ticket.title);
    println!("  Description: {}", ticket.description);
    println!("  Category: {}", ticket.category);
    println!("  Priority: {}", ticket.priority);
    println!("  Status: {}", status_label(ticket.status));
    println!(
        "  Location: block {}, floor {}{}",
        ticket.block,
        ticket.floor,
        ticket
            .location
            .as_ref()
            .map(|l| format!(", {}", l))
            .unwrap_or_default()
    );
    println!("  Reported by: {}", ticket.created_by);
    println!(
        "  Assigned to: {}",
        ticket.assigned_to.as_deref().unwrap_or("-")
    );
    if !ticket.supporters.is_empty() {
        println!("  Supporters: {}", ticket.supporters.join(", "));
    }
    println!(
        "  SLA deadline: {}",
        ticket.sla_deadline.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(before) = &ticket.images.before {
        println!("  Before image: {}", before);
    }
    if let Some(after) = &ticket.images.after {
        println!("  After image: {}", after);
    }
    if let Some(proof) = &ticket.completion_proof {
        println!("  Completion proof: {}", proof);
    }
    if let Some(rating) = ticket.rating {
        println!("  Rating: {}/5", rating);
    }

    println!("\n{}", "History".bold());
    for entry in &ticket.history {
        println!(
            "  {}  {:<12} by {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.status.as_str(),
            entry.updated_by
        );
    }

    let audit = AuditLogRepository::new(desk.database.clone())
        .list_for_ticket(&ticket.id)
        .await?;
    if !audit.is_empty() {
        println!("\n{}", "Audit trail".bold());
        for entry in audit {
            let details = if entry.details.is_empty() {
                String::new()
            } else {
                format!(" ({})", entry.details)
            };
            println!(
                "  {}  {} by {}{}",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                entry.action,
                entry.actor_id,
                details
            );
        }
    }

    Ok(())
}

/// Handle ticket claim command
pub async fn handle_claim(desk: &CliDesk, actor: &Actor, id: String) -> Result<()> {
    let ticket = update_ticket(
        &desk.ctx,
        actor,
        &id,
        UpdateRequest::status(TicketStatus::Assigned),
    )
    .await?;

    println!("{}", "✓ Ticket updated".green().bold());
    print_summary(&ticket);
    Ok(())
}

/// Handle ticket complete command
pub async fn handle_complete(desk: &CliDesk, actor: &Actor, id: String, proof: Option<String>) -> Result<()> {
    let request = UpdateRequest {
        completion_proof: proof,
        ..UpdateRequest::status(TicketStatus::Completed)
    };
    let ticket = update_ticket(&desk.ctx, actor, &id, request).await?;

    println!("{}", "✓ Ticket updated".green().bold());
    print_summary(&ticket);
    if let Some(proof) = &ticket.completion_proof {
        println!("  Completion proof: {}", proof);
    }
    Ok(())
}

/// Handle ticket update command
pub async fn handle_update(
    desk: &CliDesk,
    actor: &Actor,
    id: String,
    status: Option<String>,
    assign: Option<String>,
) -> Result<()> {
    let request = UpdateRequest {
        status: status.as_deref().map(str::parse).transpose()?,
        assigned_to: assign,
        completion_proof: None,
    };
    let ticket = update_ticket(&desk.ctx, actor, &id, request).await?;

    println!("{}", "✓ Ticket updated".green().bold());
    print_summary(&ticket);
    Ok(())
}

/// Handle ticket rate command
pub async fn handle_rate(desk: &CliDesk, actor: &Actor, id: String, rating: u8) -> Result<()> {
    let ticket = rate_ticket(&desk.ctx, actor, &id, rating).await?;

    println!("{}", "✓ Thanks for your feedback".green().bold());
    println!("  Ticket: {}", ticket.id);
    println!("  Rating: {}/5", rating);
    Ok(())
}
