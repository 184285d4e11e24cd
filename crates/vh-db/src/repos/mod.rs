//! Repository modules implementing the queries for every VenueHub domain.
//!
//! Each module adds methods to `VenueDb` via `impl VenueDb` blocks. Writes
//! that touch more than one table open a transaction with
//! [`VenueDb::begin`] and close it with [`crate::finish`].

pub mod lookup;
pub mod org_hierarchy;
pub mod permission;
pub mod questionnaire;
pub mod service_offering;
pub mod service_type;
pub mod vendor;
pub mod vendor_room;
pub mod venue;

use std::collections::BTreeSet;

use crate::error::DatabaseError;
use crate::helpers::{now_text, read_count};
use crate::query::{WhereBuilder, paginate};

/// Rows of one page plus the total matching the same WHERE clause.
pub type Listing<T> = (Vec<T>, u64);

/// Converts one result row into an entity.
pub(crate) type RowMapper<T> = fn(&libsql::Row) -> Result<T, DatabaseError>;

/// SELECT list and FROM clause (with its joins) of one domain's row query.
pub(crate) struct Source {
    pub columns: &'static str,
    pub from: &'static str,
}

/// Run the page query and the count query for a list endpoint. Both
/// statements bind the same WHERE parameters.
pub(crate) async fn fetch_page<T>(
    conn: &libsql::Connection,
    source: &Source,
    filter: &WhereBuilder,
    order: &str,
    limit: u64,
    offset: u64,
    map: RowMapper<T>,
) -> Result<Listing<T>, DatabaseError> {
    let Source { columns, from } = source;
    let where_sql = filter.to_sql();
    let sql = format!(
        "SELECT {columns} FROM {from} {where_sql} {order} {}",
        paginate(limit, offset)
    );
    tracing::debug!(%sql, "list query");

    let mut rows = conn
        .query(&sql, libsql::params_from_iter(filter.params()))
        .await?;
    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        items.push(map(&row)?);
    }

    let count_sql = format!("SELECT COUNT(*) FROM {from} {where_sql}");
    let total = read_count(
        conn.query(&count_sql, libsql::params_from_iter(filter.params()))
            .await?,
    )
    .await?;

    Ok((items, total))
}

/// Fetch at most one row by id.
pub(crate) async fn fetch_one<T>(
    conn: &libsql::Connection,
    source: &Source,
    id_column: &str,
    id: i64,
    map: RowMapper<T>,
) -> Result<Option<T>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {id_column} = ?1",
        source.columns, source.from
    );
    let mut rows = conn.query(&sql, [id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(map(&row)?)),
        None => Ok(None),
    }
}

/// Set or clear `archived_at` on one row. Returns `false` when no row has
/// that id.
pub(crate) async fn set_archived(
    conn: &libsql::Connection,
    table: &str,
    id: i64,
    archived: bool,
) -> Result<bool, DatabaseError> {
    let now = now_text();
    let archived_at = archived.then(|| now.clone());
    let sql = format!("UPDATE {table} SET archived_at = ?1, updated_at = ?2 WHERE id = ?3");
    let changed = conn
        .execute(&sql, libsql::params![archived_at, now, id])
        .await?;
    if changed > 0 {
        tracing::info!(table, id, archived, "archive state changed");
    }
    Ok(changed > 0)
}

/// Case-insensitive name lookup, optionally ignoring one row (the row being
/// edited).
pub(crate) async fn name_taken(
    conn: &libsql::Connection,
    table: &str,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let sql = format!(
        "SELECT COUNT(*) FROM {table} WHERE lower(trim(name)) = lower(trim(?1)) AND (?2 IS NULL OR id != ?2)"
    );
    let count = read_count(conn.query(&sql, libsql::params![name, exclude_id]).await?).await?;
    Ok(count > 0)
}

pub(crate) fn id_set(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}
