//! Common test utilities and setup

#![allow(dead_code)]

use facilitydesk::{
    Category, Database, DeskConfig, DeskContext, NewTicket, Priority, Role, User, UserDirectory,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Create a migrated on-disk test database with a unique name
pub async fn setup_test_db() -> (TempDir, Arc<Database>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let counter = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_path = temp_dir.path().join(format!("test_{}.db", counter));

    let db = Database::initialize(&db_path)
        .await
        .expect("Failed to create test database");

    (temp_dir, Arc::new(db))
}

/// Users seeded into a SQLite desk
pub struct SeededUsers {
    pub faculty: User,
    pub faculty_b: User,
    pub worker_x: User,
    pub worker_y: User,
    pub admin: User,
}

/// SQLite-backed desk with seeded users
pub async fn setup_sqlite_desk() -> (TempDir, Arc<Database>, DeskContext, SeededUsers) {
    let (temp_dir, db) = setup_test_db().await;
    let ctx = DeskContext::from_database(db.clone(), &DeskConfig::default());

    let users = SeededUsers {
        faculty: User::new("Fiona Faculty", Role::Faculty).with_id("faculty-1"),
        faculty_b: User::new("Felix Faculty", Role::Faculty).with_id("faculty-2"),
        worker_x: User::new("Xavier Worker", Role::Worker).with_id("worker-x"),
        worker_y: User::new("Yara Worker", Role::Worker).with_id("worker-y"),
        admin: User::new("Ada Admin", Role::Admin).with_id("admin-1"),
    };
    for user in [
        &users.faculty,
        &users.faculty_b,
        &users.worker_x,
        &users.worker_y,
        &users.admin,
    ] {
        ctx.users().save(user).await.expect("Failed to seed user");
    }

    (temp_dir, db, ctx, users)
}

/// Valid creation fields without an explicit title
pub fn fields(block: &str, floor: &str, category: Category, priority: Priority) -> NewTicket {
    facilitydesk::testing::sample_ticket(block, floor, category, priority)
}
