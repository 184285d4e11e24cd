//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` / `OR IGNORE` for
//! idempotent re-running.

use crate::VenueDb;
use crate::error::DatabaseError;

/// Initial schema: lookups, domain tables, join tables, indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");
/// Seeded statuses (Active, Inactive, Draft).
const MIGRATION_002: &str = include_str!("../migrations/002_seed_statuses.sql");

impl VenueDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_seed_statuses: {e}")))?;
        Ok(())
    }
}
