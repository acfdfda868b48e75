//! Integration tests for concurrent claims and point awards

mod common;

use async_trait::async_trait;
use facilitydesk::testing::{sample_ticket, TestDesk};
use facilitydesk::{
    create_ticket, get_ticket, update_ticket, Actor, Category, ContextBuilder, DeskContext,
    DeskError, InMemoryTicketStore, Priority, Role, Ticket, TicketQuery, TicketStatus,
    TicketStore, UpdateRequest, UserDirectory, WriteGuard,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const CONTENDERS: usize = 8;

fn contenders() -> Vec<Actor> {
    (0..CONTENDERS)
        .map(|i| Actor::new(format!("worker-{}", i), format!("Worker {}", i), Role::Worker))
        .collect()
}

/// Race every contender to claim `ticket_id`; returns each result by contender
async fn race_claims(ctx: &DeskContext, ticket_id: &str, workers: Vec<Actor>) -> Vec<(Actor, Result<(), DeskError>)> {
    let mut handles = vec![];
    for worker in workers {
        let ctx = ctx.clone();
        let ticket_id = ticket_id.to_string();
        handles.push(tokio::spawn(async move {
            let result = update_ticket(
                &ctx,
                &worker,
                &ticket_id,
                UpdateRequest::status(TicketStatus::Assigned),
            )
            .await
            .map(|_| ());
            (worker, result)
        }));
    }

    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect()
}

fn assert_single_winner(results: &[(Actor, Result<(), DeskError>)]) -> Actor {
    let winners: Vec<&Actor> = results
        .iter()
        .filter(|(_, result)| result.is_ok())
        .map(|(worker, _)| worker)
        .collect();
    assert_eq!(winners.len(), 1, "exactly one claim must succeed");

    for (_, result) in results.iter().filter(|(_, result)| result.is_err()) {
        assert!(matches!(result, Err(DeskError::InvalidTransition(_))));
    }
    winners[0].clone()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_in_memory() {
    let desk = TestDesk::seeded();
    let ticket = desk.reported_ticket(Priority::High).await;

    let results = race_claims(&desk.ctx, &ticket.id, contenders()).await;
    let winner = assert_single_winner(&results);

    let stored = get_ticket(&desk.ctx, &ticket.id).await.unwrap();
    assert_eq!(stored.status, TicketStatus::Assigned);
    assert_eq!(stored.assigned_to.as_deref(), Some(winner.id.as_str()));
    assert_eq!(stored.history.len(), 2);
    assert_eq!(stored.history[1].updated_by, winner.id);

    // Only the winning claim notifies the reporter
    assert_eq!(desk.notifications.for_recipient(&desk.faculty.id).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_on_sqlite() {
    let (_temp_dir, _db, ctx, users) = common::setup_sqlite_desk().await;
    let ticket = facilitydesk::create_ticket(
        &ctx,
        &users.faculty.actor(),
        common::fields("A", "2", facilitydesk::Category::Electrical, Priority::Normal),
    )
    .await
    .unwrap()
    .into_ticket();

    let results = race_claims(&ctx, &ticket.id, contenders()).await;
    let winner = assert_single_winner(&results);

    let stored = get_ticket(&ctx, &ticket.id).await.unwrap();
    assert_eq!(stored.assigned_to.as_deref(), Some(winner.id.as_str()));
    assert_eq!(stored.history.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_point_awards_sum() {
    let (_temp_dir, _db, ctx, users) = common::setup_sqlite_desk().await;
    let worker_id = users.worker_x.id.clone();

    let mut handles = vec![];
    for _ in 0..10 {
        let ctx = ctx.clone();
        let worker_id = worker_id.clone();
        handles.push(tokio::spawn(async move {
            ctx.users().award_points(&worker_id, 30).await
        }));
    }
    for joined in futures::future::join_all(handles).await {
        joined.unwrap().unwrap();
    }

    let worker = ctx.users().find_by_id(&worker_id).await.unwrap();
    assert_eq!(worker.points, 300);
    assert_eq!(worker.total_jobs, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completions_across_tickets() {
    let desk = TestDesk::seeded();

    let mut tickets = vec![];
    for _ in 0..6 {
        let ticket = desk.reported_ticket(Priority::Urgent).await;
        update_ticket(&desk.ctx, &desk.worker_y, &ticket.id, UpdateRequest::status(TicketStatus::Assigned))
            .await
            .unwrap();
        tickets.push(ticket);
    }

    let mut handles = vec![];
    for ticket in &tickets {
        let ctx = desk.ctx.clone();
        let worker = desk.worker_y.clone();
        let ticket_id = ticket.id.clone();
        handles.push(tokio::spawn(async move {
            update_ticket(&ctx, &worker, &ticket_id, UpdateRequest::status(TicketStatus::Completed)).await
        }));
    }
    for joined in futures::future::join_all(handles).await {
        assert_eq!(joined.unwrap().unwrap().status, TicketStatus::Completed);
    }

    let worker = desk.user(&desk.worker_y.id).await;
    assert_eq!(worker.points, 300);
    assert_eq!(worker.total_jobs, 6);
}

/// Ticket store where `worker-x` claims a ticket right after the next read
/// hands it out, before the reader writes back
struct InterleavingStore {
    inner: Arc<InMemoryTicketStore>,
    claim_after_find_many: AtomicBool,
    claim_after_find_by_id: AtomicBool,
}

impl InterleavingStore {
    fn new(inner: Arc<InMemoryTicketStore>) -> Self {
        Self {
            inner,
            claim_after_find_many: AtomicBool::new(false),
            claim_after_find_by_id: AtomicBool::new(false),
        }
    }

    async fn claim_behind_reader(&self, ticket: &Ticket) {
        let mut claimed = ticket.clone();
        claimed.status = TicketStatus::Assigned;
        claimed.assigned_to = Some("worker-x".to_string());
        claimed.record_history("worker-x", facilitydesk::models::now());
        let won = self
            .inner
            .save_guarded(&claimed, &WriteGuard::StatusIs(TicketStatus::Reported))
            .await
            .unwrap();
        assert!(won, "interleaved claim must land");
    }
}

#[async_trait]
impl TicketStore for InterleavingStore {
    async fn create(&self, ticket: &Ticket) -> facilitydesk::Result<String> {
        self.inner.create(ticket).await
    }

    async fn find_by_id(&self, id: &str) -> facilitydesk::Result<Ticket> {
        let ticket = self.inner.find_by_id(id).await?;
        if self.claim_after_find_by_id.swap(false, Ordering::SeqCst) {
            self.claim_behind_reader(&ticket).await;
        }
        Ok(ticket)
    }

    async fn find_many(&self, query: &TicketQuery) -> facilitydesk::Result<Vec<Ticket>> {
        let found = self.inner.find_many(query).await?;
        if let Some(first) = found.first() {
            if self.claim_after_find_many.swap(false, Ordering::SeqCst) {
                self.claim_behind_reader(first).await;
            }
        }
        Ok(found)
    }

    async fn save_guarded(&self, ticket: &Ticket, guard: &WriteGuard) -> facilitydesk::Result<bool> {
        self.inner.save_guarded(ticket, guard).await
    }

    async fn add_supporter(&self, ticket_id: &str, user_id: &str) -> facilitydesk::Result<bool> {
        self.inner.add_supporter(ticket_id, user_id).await
    }
}

fn interleaving_desk() -> (TestDesk, Arc<InterleavingStore>, DeskContext) {
    let desk = TestDesk::seeded();
    let store = Arc::new(InterleavingStore::new(desk.tickets.clone()));
    let ctx = ContextBuilder::new()
        .with_ticket_store(store.clone())
        .with_user_directory(desk.users.clone())
        .with_notification_sink(desk.notifications.clone())
        .with_audit_sink(desk.audit.clone())
        .build()
        .unwrap();
    (desk, store, ctx)
}

#[tokio::test]
async fn test_duplicate_merge_keeps_concurrent_claim() {
    let (desk, store, ctx) = interleaving_desk();
    let original = desk.reported_ticket(Priority::Normal).await;

    store.claim_after_find_many.store(true, Ordering::SeqCst);
    let outcome = create_ticket(
        &ctx,
        &desk.faculty_b,
        sample_ticket(&original.block, &original.floor, Category::Infrastructure, Priority::Normal),
    )
    .await
    .unwrap();

    assert!(outcome.is_duplicate());
    assert_eq!(outcome.ticket().status, TicketStatus::Assigned);
    assert_eq!(outcome.ticket().supporters, vec!["faculty-2".to_string()]);

    let stored = get_ticket(&desk.ctx, &original.id).await.unwrap();
    assert_eq!(stored.status, TicketStatus::Assigned);
    assert_eq!(stored.assigned_to.as_deref(), Some("worker-x"));
    assert_eq!(stored.supporters, vec!["faculty-2".to_string()]);
    assert_eq!(stored.history.len(), 2);

    // The claim stands, so nobody else can take the ticket
    let err = update_ticket(
        &desk.ctx,
        &desk.worker_y,
        &original.id,
        UpdateRequest::status(TicketStatus::Assigned),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition(_)));
}

#[tokio::test]
async fn test_admin_update_reapplies_over_concurrent_claim() {
    let (desk, store, ctx) = interleaving_desk();
    let original = desk.reported_ticket(Priority::High).await;

    store.claim_after_find_by_id.store(true, Ordering::SeqCst);
    let updated = update_ticket(
        &ctx,
        &desk.admin,
        &original.id,
        UpdateRequest::status(TicketStatus::InProgress),
    )
    .await
    .unwrap();

    assert_eq!(updated.status, TicketStatus::InProgress);
    assert_eq!(updated.assigned_to.as_deref(), Some("worker-x"));

    let stored = get_ticket(&desk.ctx, &original.id).await.unwrap();
    assert_eq!(stored, updated);
    let statuses: Vec<TicketStatus> = stored.history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![TicketStatus::Reported, TicketStatus::Assigned, TicketStatus::InProgress]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_supporters_and_claim_on_sqlite() {
    let (_temp_dir, _db, ctx, users) = common::setup_sqlite_desk().await;
    let ticket = create_ticket(
        &ctx,
        &users.faculty.actor(),
        common::fields("G", "1", Category::Cleaning, Priority::Normal),
    )
    .await
    .unwrap()
    .into_ticket();

    let reporters: Vec<Actor> = (0..6)
        .map(|i| Actor::new(format!("faculty-extra-{}", i), format!("Reporter {}", i), Role::Faculty))
        .collect();

    let mut handles = vec![];
    for reporter in reporters {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            create_ticket(&ctx, &reporter, common::fields("G", "1", Category::Cleaning, Priority::Normal))
                .await
                .map(|outcome| outcome.is_duplicate())
        }));
    }
    let claimer = {
        let ctx = ctx.clone();
        let worker = users.worker_x.actor();
        let ticket_id = ticket.id.clone();
        tokio::spawn(async move {
            update_ticket(&ctx, &worker, &ticket_id, UpdateRequest::status(TicketStatus::Assigned)).await
        })
    };

    for joined in futures::future::join_all(handles).await {
        assert!(joined.unwrap().unwrap());
    }
    claimer.await.unwrap().unwrap();

    let stored = get_ticket(&ctx, &ticket.id).await.unwrap();
    assert_eq!(stored.status, TicketStatus::Assigned);
    assert_eq!(stored.assigned_to.as_deref(), Some("worker-x"));
    assert_eq!(stored.supporters.len(), 6);
    assert_eq!(stored.history.len(), 2);
}
