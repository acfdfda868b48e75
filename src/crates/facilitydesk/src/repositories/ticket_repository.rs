//! Ticket repository for database operations

use super::{from_millis, to_millis};
use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::models::{HistoryEntry, Ticket, TicketImages, TicketStatus};
use crate::store::{TicketQuery, TicketStore, Visibility, WriteGuard};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;
use tracing::debug;

const TICKET_COLUMNS: &str = "id, title, description, category, priority, block, floor, location,
    image_before, image_after, status, created_by, assigned_to, supporters, sla_deadline,
    rating, completion_proof, history, created_at, updated_at";

/// Repository for ticket documents
#[derive(Clone, Debug)]
pub struct TicketRepository {
    db: Arc<Database>,
}

impl TicketRepository {
    /// Create a new ticket repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Count tickets matching a query
    pub async fn count(&self, query: &TicketQuery) -> Result<i64> {
        let (where_sql, binds) = where_clause(query);
        let sql = format!("SELECT COUNT(*) AS count FROM tickets{}", where_sql);

        let mut q = sqlx::query(&sql);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        let row = q
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| DeskError::Database(format!("Failed to count tickets: {}", e)))?;

        Ok(row.try_get("count")?)
    }
}

/// Build the WHERE clause and its positional bind values
fn where_clause(query: &TicketQuery) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    match &query.visibility {
        Visibility::All => {}
        Visibility::CreatedBy(user) => {
            conditions.push("created_by = ?".to_string());
            binds.push(user.clone());
        }
        Visibility::OpenPoolOrAssignedTo(user) => {
            conditions.push("(status = ? OR assigned_to = ?)".to_string());
            binds.push(TicketStatus::Reported.as_str().to_string());
            binds.push(user.clone());
        }
    }

    if let Some(statuses) = &query.statuses {
        if statuses.is_empty() {
            conditions.push("0".to_string());
        } else {
            let placeholders = vec!["?"; statuses.len()].join(", ");
            conditions.push(format!("status IN ({})", placeholders));
            binds.extend(statuses.iter().map(|s| s.as_str().to_string()));
        }
    }
    if let Some(category) = query.category {
        conditions.push("category = ?".to_string());
        binds.push(category.as_str().to_string());
    }
    if let Some(priority) = query.priority {
        conditions.push("priority = ?".to_string());
        binds.push(priority.as_str().to_string());
    }
    if let Some(block) = &query.block {
        conditions.push("block = ?".to_string());
        binds.push(block.clone());
    }
    if let Some(floor) = &query.floor {
        conditions.push("floor = ?".to_string());
        binds.push(floor.clone());
    }

    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), binds)
    }
}

fn row_to_ticket(row: &SqliteRow) -> Result<Ticket> {
    let supporters: String = row.try_get("supporters")?;
    let history: String = row.try_get("history")?;
    let rating: Option<i64> = row.try_get("rating")?;

    Ok(Ticket {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get::<String, _>("category")?.parse()?,
        priority: row.try_get::<String, _>("priority")?.parse()?,
        block: row.try_get("block")?,
        floor: row.try_get("floor")?,
        location: row.try_get("location")?,
        images: TicketImages {
            before: row.try_get("image_before")?,
            after: row.try_get("image_after")?,
        },
        status: row.try_get::<String, _>("status")?.parse()?,
        created_by: row.try_get("created_by")?,
        assigned_to: row.try_get("assigned_to")?,
        supporters: serde_json::from_str(&supporters)?,
        sla_deadline: from_millis(row.try_get("sla_deadline")?)?,
        rating: rating
            .map(u8::try_from)
            .transpose()
            .map_err(|e| DeskError::Database(format!("Invalid rating: {}", e)))?,
        completion_proof: row.try_get("completion_proof")?,
        history: serde_json::from_str::<Vec<HistoryEntry>>(&history)?,
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn create(&self, ticket: &Ticket) -> Result<String> {
        sqlx::query(
            "INSERT INTO tickets (id, title, description, category, priority, block, floor,
                                  location, image_before, image_after, status, created_by,
                                  assigned_to, supporters, sla_deadline, rating,
                                  completion_proof, history, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ticket.id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.category.as_str())
        .bind(ticket.priority.as_str())
        .bind(&ticket.block)
        .bind(&ticket.floor)
        .bind(&ticket.location)
        .bind(&ticket.images.before)
        .bind(&ticket.images.after)
        .bind(ticket.status.as_str())
        .bind(&ticket.created_by)
        .bind(&ticket.assigned_to)
        .bind(serde_json::to_string(&ticket.supporters)?)
        .bind(to_millis(ticket.sla_deadline))
        .bind(ticket.rating.map(i64::from))
        .bind(&ticket.completion_proof)
        .bind(serde_json::to_string(&ticket.history)?)
        .bind(to_millis(ticket.created_at))
        .bind(to_millis(ticket.updated_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to save ticket: {}", e)))?;

        debug!(ticket_id = %ticket.id, "Inserted ticket");
        Ok(ticket.id.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Ticket> {
        let sql = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| DeskError::Database(format!("Failed to load ticket: {}", e)))?
            .ok_or_else(|| DeskError::NotFound(format!("Ticket not found: {}", id)))?;

        row_to_ticket(&row)
    }

    async fn find_many(&self, query: &TicketQuery) -> Result<Vec<Ticket>> {
        let (where_sql, binds) = where_clause(query);
        let mut sql = format!(
            "SELECT {} FROM tickets{} ORDER BY created_at DESC, rowid DESC",
            TICKET_COLUMNS, where_sql
        );
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut q = sqlx::query(&sql);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        let rows = q
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| DeskError::Database(format!("Failed to list tickets: {}", e)))?;

        rows.iter().map(row_to_ticket).collect()
    }

    async fn save_guarded(&self, ticket: &Ticket, guard: &WriteGuard) -> Result<bool> {
        let guard_sql = match guard {
            WriteGuard::None => "",
            WriteGuard::StatusIs(_) => " AND status = ?",
            WriteGuard::AssignedTo(_) => " AND assigned_to = ?",
            WriteGuard::Revision(_) => " AND json_array_length(history) = ?",
        };
        let sql = format!(
            "UPDATE tickets
             SET title = ?, description = ?, category = ?, priority = ?, block = ?, floor = ?,
                 location = ?, image_before = ?, image_after = ?, status = ?, assigned_to = ?,
                 sla_deadline = ?, rating = ?, completion_proof = ?,
                 history = ?, updated_at = ?
             WHERE id = ?{}",
            guard_sql
        );

        let mut q = sqlx::query(&sql)
            .bind(&ticket.title)
            .bind(&ticket.description)
            .bind(ticket.category.as_str())
            .bind(ticket.priority.as_str())
            .bind(&ticket.block)
            .bind(&ticket.floor)
            .bind(&ticket.location)
            .bind(&ticket.images.before)
            .bind(&ticket.images.after)
            .bind(ticket.status.as_str())
            .bind(&ticket.assigned_to)
            .bind(to_millis(ticket.sla_deadline))
            .bind(ticket.rating.map(i64::from))
            .bind(&ticket.completion_proof)
            .bind(serde_json::to_string(&ticket.history)?)
            .bind(to_millis(ticket.updated_at))
            .bind(&ticket.id);

        q = match guard {
            WriteGuard::None => q,
            WriteGuard::StatusIs(status) => q.bind(status.as_str()),
            WriteGuard::AssignedTo(user) => q.bind(user.as_str()),
            WriteGuard::Revision(len) => q.bind(*len as i64),
        };

        let result = q
            .execute(self.db.pool())
            .await
            .map_err(|e| DeskError::Database(format!("Failed to update ticket: {}", e)))?;

        let written = result.rows_affected() == 1;
        if !written {
            debug!(ticket_id = %ticket.id, ?guard, "Guarded update matched no row");
        }
        Ok(written)
    }

    async fn add_supporter(&self, ticket_id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE tickets
             SET supporters = json_insert(supporters, '$[#]', ?)
             WHERE id = ?
               AND NOT EXISTS (SELECT 1 FROM json_each(tickets.supporters) WHERE value = ?)",
        )
        .bind(user_id)
        .bind(ticket_id)
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| DeskError::Database(format!("Failed to add supporter: {}", e)))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        // Nothing changed: either already a supporter or no such ticket
        self.find_by_id(ticket_id).await?;
        Ok(false)
    }
}
