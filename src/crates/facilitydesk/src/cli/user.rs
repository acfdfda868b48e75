//! User management command handlers

use crate::cli::CliDesk;
use crate::error::Result;
use crate::models::{Role, User};
use crate::repositories::UserRepository;
use crate::store::UserDirectory;
use colored::Colorize;
use tabled::{Table, Tabled};

/// User display row for table output
#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Points")]
    points: i64,
    #[tabled(rename = "Jobs")]
    total_jobs: i64,
}

/// Handle user add command
pub async fn handle_add(desk: &CliDesk, name: String, role: String, id: Option<String>) -> Result<()> {
    let role: Role = role.parse()?;
    let mut user = User::new(name, role);
    if let Some(id) = id {
        user = user.with_id(id);
    }

    desk.ctx.users().save(&user).await?;

    println!("{}", "✓ User added".green().bold());
    println!("  ID: {}", user.id);
    println!("  Name: {}", user.name);
    println!("  Role: {}", user.role);

    Ok(())
}

/// Handle user list command
pub async fn handle_list(desk: &CliDesk) -> Result<()> {
    let repo = UserRepository::new(desk.database.clone());
    let users = repo.list().await?;

    if users.is_empty() {
        println!("{}", "No users found".yellow());
        return Ok(());
    }

    let rows: Vec<UserRow> = users
        .into_iter()
        .map(|user| UserRow {
            id: user.id,
            name: user.name,
            role: user.role.to_string(),
            points: user.points,
            total_jobs: user.total_jobs,
        })
        .collect();

    let count = rows.len();
    println!("{}", Table::new(rows));
    println!("\nTotal: {} users", count);

    Ok(())
}
