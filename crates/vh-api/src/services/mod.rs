//! Service layer: business rules between the controllers and `VenueDb`.
//!
//! Services check what the schema cannot: referenced ids exist, names are
//! unique, clone sources are valid, questionnaire answers obey their rules.
//! They hold an `Arc<VenueDb>` and never build SQL themselves.

pub mod image;
pub mod lookup;
pub mod org_hierarchy;
pub mod permission;
pub mod questionnaire;
pub mod service_offering;
pub mod service_type;
pub mod vendor;
pub mod vendor_room;
pub mod venue;

use vh_core::enums::CreateType;
use vh_core::pagination::Page;
use vh_core::requests::ListRequest;
use vh_db::VenueDb;
use vh_db::repos::Listing;
use vh_db::repos::lookup::RefTable;

use crate::error::ApiError;

/// Paging bounds applied to every list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Limits {
    pub(crate) fn clamp<F>(self, request: &mut ListRequest<F>) {
        if request.limit > self.max_limit {
            tracing::debug!(requested = request.limit, max = self.max_limit, "limit clamped");
            request.limit = self.max_limit;
        }
    }
}

pub(crate) fn page<T, F>((rows, total): Listing<T>, request: &ListRequest<F>) -> Page<T> {
    Page::new(rows, total, request.offset, request.limit)
}

/// `NotFound` naming every id from `ids` that has no row in `table`.
pub(crate) async fn ensure_exist(
    db: &VenueDb,
    table: RefTable,
    ids: &[i64],
) -> Result<(), ApiError> {
    let missing = db.missing_ids(table, ids).await?;
    if missing.is_empty() {
        return Ok(());
    }
    let list = missing
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(ApiError::NotFound(format!("{} not found: {list}", table.label())))
}

pub(crate) async fn ensure_one(db: &VenueDb, table: RefTable, id: i64) -> Result<(), ApiError> {
    if db.record_exists(table, id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found(table.label(), id))
    }
}

pub(crate) async fn ensure_optional(
    db: &VenueDb,
    table: RefTable,
    id: Option<i64>,
) -> Result<(), ApiError> {
    match id {
        Some(id) => ensure_one(db, table, id).await,
        None => Ok(()),
    }
}

/// Resolve the clone source of a create request. A `new` request drops any
/// `cloneId` it carries; a `clone` request needs one that exists.
pub(crate) async fn resolve_clone(
    db: &VenueDb,
    table: RefTable,
    create_type: CreateType,
    clone_id: Option<i64>,
) -> Result<Option<i64>, ApiError> {
    if create_type == CreateType::New {
        return Ok(None);
    }
    let invalid = || ApiError::BadRequest("Invalid cloned id".into());
    let id = clone_id.ok_or_else(invalid)?;
    if db.record_exists(table, id).await? {
        Ok(Some(id))
    } else {
        Err(invalid())
    }
}

pub(crate) fn found<T>(value: Option<T>, label: &str, id: i64) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::not_found(label, id))
}

pub(crate) fn touched(found: bool, label: &str, id: i64) -> Result<(), ApiError> {
    if found {
        Ok(())
    } else {
        Err(ApiError::not_found(label, id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use vh_db::VenueDb;

    /// In-memory database with profile 1, roles 1..=3, clients 1..=2,
    /// menus 1..=2, permission groups 1..=2, work items 1..=4 and vendor 1.
    pub async fn seeded() -> Arc<VenueDb> {
        let db = VenueDb::open_local(":memory:").await.unwrap();
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
        Arc::new(db)
    }

    pub async fn count(db: &VenueDb, table: &str) -> i64 {
        let mut rows = db
            .conn()
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    }
}
