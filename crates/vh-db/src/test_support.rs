//! Shared test utilities for vh-db unit tests.

use crate::VenueDb;

/// Fresh in-memory database with migrations applied.
pub async fn test_db() -> VenueDb {
    VenueDb::open_local(":memory:").await.unwrap()
}

/// In-memory database with a small set of lookup rows:
///
/// * profile 1
/// * roles 1..=3, clients 1..=2, menus 1..=2, permission groups 1..=2
/// * work items 1..=4
/// * vendor 1 ("Harbor Hall")
pub async fn seeded_db() -> VenueDb {
    let db = test_db().await;
    db.conn()
        .execute_batch(
            "INSERT INTO profiles (first_name, last_name, email) VALUES ('Ada', 'Lovelace', 'ada@example.com');
             INSERT INTO roles (name) VALUES ('Admin'), ('Planner'), ('Viewer');
             INSERT INTO clients (name) VALUES ('Acme'), ('Globex');
             INSERT INTO menus (name, path) VALUES ('Venues', '/venues'), ('Vendors', '/vendors');
             INSERT INTO permission_groups (name) VALUES ('Operations'), ('Finance');
             INSERT INTO work_items (name) VALUES ('Setup'), ('Serve'), ('Cleanup'), ('Teardown');
             INSERT INTO vendors (name, email, status_id) VALUES ('Harbor Hall', 'events@harbor.test', 1);",
        )
        .await
        .unwrap();
    db
}

/// Count rows in `table` matching an optional raw condition.
pub async fn count_rows(db: &VenueDb, table: &str, condition: &str) -> i64 {
    let sql = if condition.is_empty() {
        format!("SELECT COUNT(*) FROM {table}")
    } else {
        format!("SELECT COUNT(*) FROM {table} WHERE {condition}")
    };
    let mut rows = db.conn().query(&sql, ()).await.unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}
