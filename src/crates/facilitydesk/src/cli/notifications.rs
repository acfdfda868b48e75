//! Notification listing command handler

use crate::cli::CliDesk;
use crate::error::Result;
use crate::models::{Actor, NotificationKind};
use crate::repositories::NotificationRepository;
use colored::Colorize;

/// Handle notifications command: most recent first
pub async fn handle_list(desk: &CliDesk, actor: &Actor, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(desk.config.notifications.recent_limit);
    let repo = NotificationRepository::new(desk.database.clone());
    let notifications = repo.recent_for_recipient(&actor.id, limit).await?;

    if notifications.is_empty() {
        println!("{}", "No notifications".yellow());
        return Ok(());
    }

    for notification in notifications {
        let tag = match notification.kind {
            NotificationKind::Alert => "ALERT".red().bold(),
            NotificationKind::Success => "DONE".green().bold(),
            NotificationKind::Info => "INFO".blue().bold(),
        };
        let related = notification
            .related_id
            .map(|id| format!(" [{}]", id))
            .unwrap_or_default();
        println!(
            "{} {:<5} {}{}",
            notification.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            tag,
            notification.message,
            related.dimmed()
        );
    }

    Ok(())
}
