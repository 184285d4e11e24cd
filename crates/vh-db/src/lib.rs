//! # vh-db
//!
//! libSQL repositories for VenueHub.
//!
//! Handles all relational state: permissions, service types and offerings,
//! vendors with their rooms and venue checklists, org hierarchies, and the
//! lookup tables they reference. Each domain module in [`repos`] adds its
//! queries to [`VenueDb`]; the shared [`query`] builder and [`relations`]
//! reconciler keep list filtering and join-table writes uniform.

pub mod error;
pub mod helpers;
mod migrations;
pub mod query;
pub mod relations;
pub mod repos;

#[cfg(test)]
pub(crate) mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all VenueHub repositories.
pub struct VenueDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl VenueDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let venue_db = Self { db, conn };
        venue_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(venue_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Begin a transaction. Dropping it without `commit()` rolls back.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self.conn.transaction().await?)
    }
}

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the
/// original error. A failed rollback is logged, not surfaced.
///
/// # Errors
///
/// Returns the error carried by `result`, or the `COMMIT` failure.
pub async fn finish<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = tx.rollback().await {
                tracing::warn!(%rollback_error, %error, "rollback failed");
            }
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> VenueDb {
        VenueDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "statuses",
            "profiles",
            "roles",
            "clients",
            "menus",
            "permission_groups",
            "work_items",
            "permissions",
            "permission_group_permissions",
            "role_permissions",
            "client_permissions",
            "permission_menus",
            "service_types",
            "service_offerings",
            "service_type_offerings",
            "service_type_work_items",
            "vendors",
            "vendor_addresses",
            "client_vendors",
            "questions",
            "question_options",
            "question_validations",
            "vendor_rooms",
            "vendor_room_answers",
            "vendor_venues",
            "vendor_venue_answers",
            "client_hierarchies",
            "hierarchy_levels",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn statuses_are_seeded() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query("SELECT status_name FROM statuses ORDER BY id", ())
            .await
            .unwrap();
        let mut names = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            names.push(row.get::<String>(0).unwrap());
        }
        assert_eq!(names, vec!["Active", "Inactive", "Draft"]);
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Run migrations again; should not fail or duplicate seeds
        db.run_migrations().await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM statuses", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 3);
    }

    #[tokio::test]
    async fn failed_result_rolls_back() {
        let db = test_db().await;
        let tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO roles (name) VALUES ('Ghost')", ())
            .await
            .unwrap();
        let result: Result<(), DatabaseError> =
            finish(tx, Err(DatabaseError::InvalidState("abort".into()))).await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM roles", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn ok_result_commits() {
        let db = test_db().await;
        let tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO roles (name) VALUES ('Kept')", ())
            .await
            .unwrap();
        finish(tx, Ok(())).await.unwrap();

        let mut rows = db
            .conn()
            .query("SELECT name FROM roles", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "Kept");
    }

    #[tokio::test]
    async fn join_rows_unique_constraint() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO roles (name) VALUES ('Admin');
                 INSERT INTO permissions (name) VALUES ('Edit');
                 INSERT INTO role_permissions (permission_id, role_id) VALUES (1, 1);",
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO role_permissions (permission_id, role_id) VALUES (1, 1)",
                (),
            )
            .await;
        assert!(result.is_err(), "Duplicate join row should be rejected");
    }
}
