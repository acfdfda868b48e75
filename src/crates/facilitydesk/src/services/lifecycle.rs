//! Ticket lifecycle engine
//!
//! Creation with duplicate merging and SLA assignment, plus the three
//! role-scoped transitions. Ticket writes and point awards are the source of
//! truth and their failures propagate. Notifications and audit entries are
//! best-effort: a sink failure is logged and the operation still succeeds.

use crate::context::DeskContext;
use crate::error::{DeskError, Result};
use crate::events::TicketEvent;
use crate::models::{
    self, Actor, AuditAction, NewAuditLog, NewNotification, NewTicket, NotificationKind, Priority,
    Role, Ticket, TicketStatus,
};
use crate::store::{TicketQuery, WriteGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of [`create_ticket`]
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// A new ticket was stored
    Created(Ticket),
    /// An open ticket already covers this issue; the caller became a supporter
    Duplicate(Ticket),
}

impl CreateOutcome {
    pub fn ticket(&self) -> &Ticket {
        match self {
            Self::Created(ticket) | Self::Duplicate(ticket) => ticket,
        }
    }

    pub fn into_ticket(self) -> Ticket {
        match self {
            Self::Created(ticket) | Self::Duplicate(ticket) => ticket,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Raw update request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub status: Option<TicketStatus>,
    pub assigned_to: Option<String>,
    /// Proof image reference, used when completing
    pub completion_proof: Option<String>,
}

impl UpdateRequest {
    pub fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Builder: Set completion proof
    pub fn with_completion_proof(mut self, proof: impl Into<String>) -> Self {
        self.completion_proof = Some(proof.into());
        self
    }

    /// Builder: Set assignee
    pub fn with_assignee(mut self, user_id: impl Into<String>) -> Self {
        self.assigned_to = Some(user_id.into());
        self
    }
}

/// A status change, resolved from the request and the caller's role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Worker takes a reported ticket
    Claim,
    /// Assignee finishes the job
    Complete { completion_proof: Option<String> },
    /// Status and/or assignee change without precondition checks
    AdminUpdate {
        status: Option<TicketStatus>,
        assigned_to: Option<String>,
    },
}

impl Transition {
    /// Dispatch on (requested status, role)
    pub fn resolve(request: UpdateRequest, role: Role) -> Self {
        match (request.status, role) {
            (Some(TicketStatus::Assigned), Role::Worker) => Self::Claim,
            (Some(TicketStatus::Completed), Role::Worker) => Self::Complete {
                completion_proof: request.completion_proof,
            },
            (status, _) => Self::AdminUpdate {
                status,
                assigned_to: request.assigned_to,
            },
        }
    }
}

/// Report an issue
///
/// If an open ticket already exists for the same block, floor and category,
/// the actor is added to its supporters (once) and that ticket is returned as
/// [`CreateOutcome::Duplicate`].
pub async fn create_ticket(ctx: &DeskContext, actor: &Actor, fields: NewTicket) -> Result<CreateOutcome> {
    let missing = fields.missing_fields();
    if !missing.is_empty() {
        return Err(DeskError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    let category = fields
        .category
        .ok_or_else(|| DeskError::Validation("Missing required fields: category".to_string()))?;

    let duplicate_query = TicketQuery::open_duplicates_of(&fields.block, &fields.floor, category);
    if let Some(existing) = ctx.tickets().find_one(&duplicate_query).await? {
        let added = ctx.tickets().add_supporter(&existing.id, &actor.id).await?;
        let existing = ctx.tickets().find_by_id(&existing.id).await?;
        info!(ticket_id = %existing.id, actor = %actor.id, added, "Duplicate ticket detected");
        ctx.event_logger()
            .log(&TicketEvent::duplicate_merged(&existing.id, &actor.id, added));
        return Ok(CreateOutcome::Duplicate(existing));
    }

    let now = models::now();
    let priority = fields.priority.unwrap_or_default();
    let sla_deadline = ctx.sla().deadline_for(priority, now);
    let ticket = Ticket::reported(fields, &actor.id, sla_deadline, now)?;
    ctx.tickets().create(&ticket).await?;

    info!(ticket_id = %ticket.id, priority = %ticket.priority, "Ticket created");

    audit(
        ctx,
        NewAuditLog::new(AuditAction::TicketCreated, &actor.id)
            .for_ticket(&ticket.id)
            .with_details(format!("Ticket created: {}", ticket.title)),
    )
    .await;

    if ticket.priority == Priority::Urgent {
        alert_workers(ctx, &ticket).await;
    }

    ctx.event_logger().log(&TicketEvent::ticket_created(
        &ticket.id,
        &actor.id,
        ticket.priority.as_str(),
    ));
    Ok(CreateOutcome::Created(ticket))
}

/// Load a ticket by id
pub async fn get_ticket(ctx: &DeskContext, ticket_id: &str) -> Result<Ticket> {
    ctx.tickets().find_by_id(ticket_id).await
}

/// Apply a status change requested by `actor`
///
/// Every successful branch appends exactly one history entry carrying the
/// resulting status and the actor.
pub async fn update_ticket(
    ctx: &DeskContext,
    actor: &Actor,
    ticket_id: &str,
    request: UpdateRequest,
) -> Result<Ticket> {
    let ticket = ctx.tickets().find_by_id(ticket_id).await?;

    match Transition::resolve(request, actor.role) {
        Transition::Claim => claim(ctx, actor, ticket).await,
        Transition::Complete { completion_proof } => complete(ctx, actor, ticket, completion_proof).await,
        Transition::AdminUpdate {
            status,
            assigned_to,
        } => admin_update(ctx, actor, ticket, status, assigned_to).await,
    }
}

async fn claim(ctx: &DeskContext, actor: &Actor, mut ticket: Ticket) -> Result<Ticket> {
    if ticket.status != TicketStatus::Reported {
        return Err(already_taken(&ticket));
    }

    ticket.assigned_to = Some(actor.id.clone());
    ticket.status = TicketStatus::Assigned;
    ticket.record_history(&actor.id, models::now());

    let guard = WriteGuard::StatusIs(TicketStatus::Reported);
    if !ctx.tickets().save_guarded(&ticket, &guard).await? {
        debug!(ticket_id = %ticket.id, worker = %actor.id, "Lost claim race");
        return Err(already_taken(&ticket));
    }

    info!(ticket_id = %ticket.id, worker = %actor.id, "Job claimed");

    audit(
        ctx,
        NewAuditLog::new(AuditAction::JobClaimed, &actor.id).for_ticket(&ticket.id),
    )
    .await;
    notify(
        ctx,
        NewNotification::new(
            &ticket.created_by,
            format!("Your ticket \"{}\" has been assigned to {}", ticket.title, actor.name),
            NotificationKind::Info,
        )
        .related_to(&ticket.id),
    )
    .await;

    ctx.event_logger().log(&TicketEvent::job_claimed(&ticket.id, &actor.id));
    Ok(ticket)
}

async fn complete(
    ctx: &DeskContext,
    actor: &Actor,
    mut ticket: Ticket,
    completion_proof: Option<String>,
) -> Result<Ticket> {
    if ticket.assigned_to.as_deref() != Some(actor.id.as_str()) {
        return Err(not_assignee(&ticket, actor));
    }

    ticket.status = TicketStatus::Completed;
    if completion_proof.is_some() {
        ticket.completion_proof = completion_proof;
    }
    ticket.record_history(&actor.id, models::now());

    let guard = WriteGuard::AssignedTo(actor.id.clone());
    if !ctx.tickets().save_guarded(&ticket, &guard).await? {
        return Err(not_assignee(&ticket, actor));
    }

    let points = ctx.points().points_for(ticket.priority);
    let worker = ctx.users().award_points(&actor.id, points).await?;

    info!(
        ticket_id = %ticket.id,
        worker = %actor.id,
        points,
        total_points = worker.points,
        "Job completed"
    );

    audit(
        ctx,
        NewAuditLog::new(AuditAction::JobCompleted, &actor.id).for_ticket(&ticket.id),
    )
    .await;
    notify(
        ctx,
        NewNotification::new(
            &ticket.created_by,
            format!("Your ticket \"{}\" is completed! Please rate.", ticket.title),
            NotificationKind::Success,
        )
        .related_to(&ticket.id),
    )
    .await;

    ctx.event_logger()
        .log(&TicketEvent::job_completed(&ticket.id, &actor.id, points));
    Ok(ticket)
}

/// Maximum tries for an admin update racing other writers
pub const ADMIN_UPDATE_ATTEMPTS: usize = 3;

/// Escape hatch: no graph check, no audit, no notification
///
/// The only rule kept is that a Reported ticket has no assignee. Setting
/// status Reported alone unassigns the ticket; assigning a Reported ticket
/// without a status moves it to Assigned.
///
/// The write is guarded on the revision that was read. When another update
/// lands first, the change is re-applied to the fresh ticket, up to
/// [`ADMIN_UPDATE_ATTEMPTS`] times.
async fn admin_update(
    ctx: &DeskContext,
    actor: &Actor,
    mut ticket: Ticket,
    status: Option<TicketStatus>,
    assigned_to: Option<String>,
) -> Result<Ticket> {
    if status == Some(TicketStatus::Reported) && assigned_to.is_some() {
        return Err(DeskError::InvalidTransition(
            "A reported ticket cannot have an assignee".to_string(),
        ));
    }

    for attempt in 1..=ADMIN_UPDATE_ATTEMPTS {
        let revision = WriteGuard::Revision(ticket.history.len());
        apply_admin_change(&mut ticket, status, assigned_to.clone());
        ticket.record_history(&actor.id, models::now());

        if ctx.tickets().save_guarded(&ticket, &revision).await? {
            warn!(
                ticket_id = %ticket.id,
                actor = %actor.id,
                role = %actor.role,
                status = %ticket.status,
                assigned_to = ?ticket.assigned_to,
                "Administrative ticket update applied"
            );
            ctx.event_logger().log(&TicketEvent::admin_updated(
                &ticket.id,
                &actor.id,
                ticket.status.as_str(),
                ticket.assigned_to.clone(),
            ));
            return Ok(ticket);
        }

        debug!(ticket_id = %ticket.id, attempt, "Ticket changed during admin update, reloading");
        ticket = ctx.tickets().find_by_id(&ticket.id).await?;
    }

    Err(concurrent_change(&ticket))
}

fn apply_admin_change(ticket: &mut Ticket, status: Option<TicketStatus>, assigned_to: Option<String>) {
    if status == Some(TicketStatus::Reported) {
        ticket.status = TicketStatus::Reported;
        ticket.assigned_to = None;
        return;
    }
    if let Some(status) = status {
        ticket.status = status;
    }
    if let Some(assignee) = assigned_to {
        ticket.assigned_to = Some(assignee);
    }
    if ticket.status == TicketStatus::Reported && ticket.assigned_to.is_some() {
        ticket.status = TicketStatus::Assigned;
    }
}

/// Record the creator's 1-5 rating of a finished ticket
pub async fn rate_ticket(ctx: &DeskContext, actor: &Actor, ticket_id: &str, rating: u8) -> Result<Ticket> {
    if !(1..=5).contains(&rating) {
        return Err(DeskError::Validation(format!(
            "Rating must be between 1 and 5, got {}",
            rating
        )));
    }

    let mut ticket = ctx.tickets().find_by_id(ticket_id).await?;
    if ticket.created_by != actor.id {
        return Err(DeskError::Unauthorized(format!(
            "Only the reporter may rate ticket {}",
            ticket.id
        )));
    }
    if !matches!(
        ticket.status,
        TicketStatus::Completed | TicketStatus::Verified | TicketStatus::Closed
    ) {
        return Err(DeskError::InvalidTransition(format!(
            "Ticket {} is {} and cannot be rated yet",
            ticket.id, ticket.status
        )));
    }

    let revision = WriteGuard::Revision(ticket.history.len());
    ticket.rating = Some(rating);
    ticket.record_history(&actor.id, models::now());
    if !ctx.tickets().save_guarded(&ticket, &revision).await? {
        return Err(concurrent_change(&ticket));
    }

    info!(ticket_id = %ticket.id, rating, "Ticket rated");

    audit(
        ctx,
        NewAuditLog::new(AuditAction::TicketRated, &actor.id)
            .for_ticket(&ticket.id)
            .with_details(format!("Rated {}/5", rating)),
    )
    .await;

    ctx.event_logger()
        .log(&TicketEvent::ticket_rated(&ticket.id, &actor.id, rating));
    Ok(ticket)
}

fn already_taken(ticket: &Ticket) -> DeskError {
    DeskError::InvalidTransition(format!("Ticket already assigned or closed: {}", ticket.id))
}

fn concurrent_change(ticket: &Ticket) -> DeskError {
    DeskError::InvalidTransition(format!(
        "Ticket {} was changed by another update, reload and retry",
        ticket.id
    ))
}

fn not_assignee(ticket: &Ticket, actor: &Actor) -> DeskError {
    DeskError::Unauthorized(format!(
        "{} is not assigned to ticket {}",
        actor.id, ticket.id
    ))
}

async fn alert_workers(ctx: &DeskContext, ticket: &Ticket) {
    let workers = match ctx.users().find_by_role(Role::Worker).await {
        Ok(workers) => workers,
        Err(e) => {
            warn!(ticket_id = %ticket.id, error = %e, "Could not load workers for urgent alert");
            return;
        }
    };

    for worker in workers {
        notify(
            ctx,
            NewNotification::new(
                &worker.id,
                format!("URGENT Job: {}", ticket.title),
                NotificationKind::Alert,
            )
            .related_to(&ticket.id),
        )
        .await;
    }
}

async fn notify(ctx: &DeskContext, notification: NewNotification) {
    let recipient = notification.recipient.clone();
    if let Err(e) = ctx.notifications().create(notification).await {
        warn!(recipient = %recipient, error = %e, "Failed to record notification");
    }
}

async fn audit(ctx: &DeskContext, entry: NewAuditLog) {
    let action = entry.action;
    if let Err(e) = ctx.audit().create(entry).await {
        warn!(action = %action, error = %e, "Failed to record audit log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::testing::{sample_ticket, TestDesk};

    #[test]
    fn test_transition_dispatch() {
        let claim = UpdateRequest::status(TicketStatus::Assigned);
        assert_eq!(Transition::resolve(claim.clone(), Role::Worker), Transition::Claim);
        assert_eq!(
            Transition::resolve(claim, Role::Admin),
            Transition::AdminUpdate {
                status: Some(TicketStatus::Assigned),
                assigned_to: None
            }
        );

        let complete = UpdateRequest::status(TicketStatus::Completed).with_completion_proof("p.jpg");
        assert_eq!(
            Transition::resolve(complete, Role::Worker),
            Transition::Complete {
                completion_proof: Some("p.jpg".to_string())
            }
        );

        let progress = UpdateRequest::status(TicketStatus::InProgress);
        assert!(matches!(
            Transition::resolve(progress, Role::Worker),
            Transition::AdminUpdate { .. }
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let desk = TestDesk::seeded();
        let mut fields = sample_ticket("A", "2", Category::Electrical, Priority::Normal);
        fields.title = "  ".to_string();
        fields.floor = String::new();

        let err = create_ticket(&desk.ctx, &desk.faculty, fields).await.unwrap_err();
        match err {
            DeskError::Validation(msg) => assert_eq!(msg, "Missing required fields: title, floor"),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(desk.tickets.is_empty());
        assert!(desk.audit.all().is_empty());
    }

    #[tokio::test]
    async fn test_create_defaults_to_normal_priority() {
        let desk = TestDesk::seeded();
        let mut fields = sample_ticket("C", "1", Category::Cleaning, Priority::Normal);
        fields.priority = None;

        let ticket = create_ticket(&desk.ctx, &desk.faculty, fields)
            .await
            .unwrap()
            .into_ticket();

        assert_eq!(ticket.priority, Priority::Normal);
        assert_eq!(ticket.sla_deadline - ticket.created_at, chrono::Duration::hours(24));
        assert!(desk.notifications.all().is_empty());

        let audit = desk.audit.for_ticket(&ticket.id);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].details, format!("Ticket created: {}", ticket.title));
    }

    #[tokio::test]
    async fn test_admin_can_reopen_ticket() {
        let desk = TestDesk::seeded();
        let ticket = desk.reported_ticket(Priority::High).await;
        update_ticket(&desk.ctx, &desk.worker_x, &ticket.id, UpdateRequest::status(TicketStatus::Assigned))
            .await
            .unwrap();

        let reopened = update_ticket(
            &desk.ctx,
            &desk.admin,
            &ticket.id,
            UpdateRequest::status(TicketStatus::Reported),
        )
        .await
        .unwrap();

        assert_eq!(reopened.status, TicketStatus::Reported);
        assert_eq!(reopened.assigned_to, None);
        assert_eq!(reopened.history.len(), 3);
    }

    #[tokio::test]
    async fn test_admin_assign_moves_reported_ticket_to_assigned() {
        let desk = TestDesk::seeded();
        let ticket = desk.reported_ticket(Priority::Low).await;

        let updated = update_ticket(
            &desk.ctx,
            &desk.admin,
            &ticket.id,
            UpdateRequest::default().with_assignee(&desk.worker_y.id),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, TicketStatus::Assigned);
        assert_eq!(updated.assigned_to.as_deref(), Some(desk.worker_y.id.as_str()));
        assert!(desk.audit.for_ticket(&ticket.id).len() == 1);

        let err = update_ticket(
            &desk.ctx,
            &desk.admin,
            &ticket.id,
            UpdateRequest::status(TicketStatus::Reported).with_assignee(&desk.worker_x.id),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DeskError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_rating_rules() {
        let desk = TestDesk::seeded();
        let ticket = desk.reported_ticket(Priority::Normal).await;

        let err = rate_ticket(&desk.ctx, &desk.faculty, &ticket.id, 4).await.unwrap_err();
        assert!(matches!(err, DeskError::InvalidTransition(_)));

        update_ticket(&desk.ctx, &desk.worker_x, &ticket.id, UpdateRequest::status(TicketStatus::Assigned))
            .await
            .unwrap();
        update_ticket(&desk.ctx, &desk.worker_x, &ticket.id, UpdateRequest::status(TicketStatus::Completed))
            .await
            .unwrap();

        let err = rate_ticket(&desk.ctx, &desk.faculty, &ticket.id, 0).await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));

        let err = rate_ticket(&desk.ctx, &desk.faculty_b, &ticket.id, 5).await.unwrap_err();
        assert!(matches!(err, DeskError::Unauthorized(_)));

        let rated = rate_ticket(&desk.ctx, &desk.faculty, &ticket.id, 5).await.unwrap();
        assert_eq!(rated.rating, Some(5));
        assert_eq!(rated.status, TicketStatus::Completed);
        assert_eq!(rated.history.last().unwrap().updated_by, desk.faculty.id);

        let actions: Vec<AuditAction> = desk
            .audit
            .for_ticket(&ticket.id)
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::TicketCreated,
                AuditAction::JobClaimed,
                AuditAction::JobCompleted,
                AuditAction::TicketRated
            ]
        );
    }

    #[tokio::test]
    async fn test_get_ticket_not_found() {
        let desk = TestDesk::seeded();
        let err = get_ticket(&desk.ctx, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
