//! Many-to-many relation reconciliation.
//!
//! Converges the rows of a join table to a desired id set by computing the
//! difference against what is stored: ids missing from the table are
//! inserted, ids no longer wanted are deleted, untouched rows keep their
//! `created_at`. Callers pass the connection of an open transaction so the
//! parent row update and the link changes commit together.

use std::collections::BTreeSet;

use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{now_text, read_ids};

/// Describes one join table: `owner_column` points at the entity being
/// edited, `related_column` at the linked entity.
///
/// `scope_column`, when set, partitions the owner's links (a NULL scope is a
/// partition of its own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub related_column: &'static str,
    pub scope_column: Option<&'static str>,
}

impl JoinTable {
    /// The same table read from the related side.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            table: self.table,
            owner_column: self.related_column,
            related_column: self.owner_column,
            scope_column: self.scope_column,
        }
    }
}

pub const PERMISSION_ROLES: JoinTable = JoinTable {
    table: "role_permissions",
    owner_column: "permission_id",
    related_column: "role_id",
    scope_column: None,
};

pub const PERMISSION_CLIENTS: JoinTable = JoinTable {
    table: "client_permissions",
    owner_column: "permission_id",
    related_column: "client_id",
    scope_column: None,
};

pub const PERMISSION_MENUS: JoinTable = JoinTable {
    table: "permission_menus",
    owner_column: "permission_id",
    related_column: "menu_id",
    scope_column: None,
};

pub const PERMISSION_GROUPS: JoinTable = JoinTable {
    table: "permission_group_permissions",
    owner_column: "permission_id",
    related_column: "permission_group_id",
    scope_column: None,
};

pub const OFFERING_SERVICE_TYPES: JoinTable = JoinTable {
    table: "service_type_offerings",
    owner_column: "service_offering_id",
    related_column: "service_type_id",
    scope_column: None,
};

pub const SERVICE_TYPE_OFFERINGS: JoinTable = OFFERING_SERVICE_TYPES.reversed();

pub const SERVICE_TYPE_WORK_ITEMS: JoinTable = JoinTable {
    table: "service_type_work_items",
    owner_column: "service_type_id",
    related_column: "work_item_id",
    scope_column: Some("service_offering_id"),
};

pub const VENDOR_CLIENTS: JoinTable = JoinTable {
    table: "client_vendors",
    owner_column: "vendor_id",
    related_column: "client_id",
    scope_column: None,
};

/// Inserts and deletes needed to move `current` to `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationDiff {
    pub to_add: BTreeSet<i64>,
    pub to_remove: BTreeSet<i64>,
}

impl RelationDiff {
    #[must_use]
    pub fn compute(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> Self {
        Self {
            to_add: desired.difference(current).copied().collect(),
            to_remove: current.difference(desired).copied().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Owner (and optional scope) condition shared by reads and deletes.
fn owner_condition(join: &JoinTable, owner_id: i64, scope: Option<i64>) -> (String, Vec<Value>) {
    let mut sql = format!("{} = ?1", join.owner_column);
    let mut params: Vec<Value> = vec![owner_id.into()];
    if let Some(scope_column) = join.scope_column {
        match scope {
            Some(scope_id) => {
                params.push(scope_id.into());
                sql.push_str(&format!(" AND {scope_column} = ?{}", params.len()));
            }
            None => sql.push_str(&format!(" AND {scope_column} IS NULL")),
        }
    }
    (sql, params)
}

/// Ids currently linked to `owner_id` in `join`.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn linked_ids(
    conn: &libsql::Connection,
    join: &JoinTable,
    owner_id: i64,
    scope: Option<i64>,
) -> Result<BTreeSet<i64>, DatabaseError> {
    let (condition, params) = owner_condition(join, owner_id, scope);
    let sql = format!(
        "SELECT {related} FROM {table} WHERE {condition} ORDER BY {related}",
        related = join.related_column,
        table = join.table,
    );
    let rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    Ok(read_ids(rows).await?.into_iter().collect())
}

/// Converge the links of `owner_id` to exactly `desired`.
///
/// Issues no statements when nothing changed. Must run on the connection of
/// the caller's transaction.
///
/// # Errors
///
/// Returns `DatabaseError` if a read, delete or insert fails; the caller's
/// transaction is then rolled back as a whole.
pub async fn reconcile(
    conn: &libsql::Connection,
    join: &JoinTable,
    owner_id: i64,
    scope: Option<i64>,
    desired: &BTreeSet<i64>,
) -> Result<RelationDiff, DatabaseError> {
    let current = linked_ids(conn, join, owner_id, scope).await?;
    let diff = RelationDiff::compute(&current, desired);
    if diff.is_empty() {
        return Ok(diff);
    }

    if !diff.to_remove.is_empty() {
        let (condition, mut params) = owner_condition(join, owner_id, scope);
        let start = params.len();
        let placeholders: Vec<String> = diff
            .to_remove
            .iter()
            .enumerate()
            .map(|(i, id)| {
                params.push((*id).into());
                format!("?{}", start + i + 1)
            })
            .collect();
        let sql = format!(
            "DELETE FROM {table} WHERE {condition} AND {related} IN ({list})",
            table = join.table,
            related = join.related_column,
            list = placeholders.join(", "),
        );
        conn.execute(&sql, libsql::params_from_iter(params)).await?;
    }

    let now = now_text();
    for related_id in &diff.to_add {
        match join.scope_column {
            Some(scope_column) => {
                let sql = format!(
                    "INSERT INTO {table} ({owner}, {related}, {scope_column}, created_at) VALUES (?1, ?2, ?3, ?4)",
                    table = join.table,
                    owner = join.owner_column,
                    related = join.related_column,
                );
                conn.execute(
                    &sql,
                    libsql::params![owner_id, *related_id, scope, now.as_str()],
                )
                .await?;
            }
            None => {
                let sql = format!(
                    "INSERT INTO {table} ({owner}, {related}, created_at) VALUES (?1, ?2, ?3)",
                    table = join.table,
                    owner = join.owner_column,
                    related = join.related_column,
                );
                conn.execute(&sql, libsql::params![owner_id, *related_id, now.as_str()])
                    .await?;
            }
        }
    }

    tracing::debug!(
        table = join.table,
        owner_id,
        added = diff.to_add.len(),
        removed = diff.to_remove.len(),
        "relation reconciled"
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VenueDb;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&[], &[1, 2, 3])]
    #[case(&[1, 2, 3], &[])]
    #[case(&[1, 2, 3], &[2, 3, 4])]
    #[case(&[5, 9], &[5, 9])]
    #[case(&[1], &[7, 8])]
    fn diff_converges_to_desired(#[case] current: &[i64], #[case] desired: &[i64]) {
        let current = set(current);
        let desired = set(desired);
        let diff = RelationDiff::compute(&current, &desired);

        assert!(diff.to_add.is_disjoint(&diff.to_remove));
        let converged: BTreeSet<i64> = current
            .union(&diff.to_add)
            .copied()
            .filter(|id| !diff.to_remove.contains(id))
            .collect();
        assert_eq!(converged, desired);
        assert_eq!(diff.is_empty(), current == desired);
    }

    #[test]
    fn reversed_swaps_columns() {
        assert_eq!(SERVICE_TYPE_OFFERINGS.owner_column, "service_type_id");
        assert_eq!(SERVICE_TYPE_OFFERINGS.related_column, "service_offering_id");
        assert_eq!(SERVICE_TYPE_OFFERINGS.table, "service_type_offerings");
    }

    async fn db_with_permission() -> VenueDb {
        let db = VenueDb::open_local(":memory:").await.unwrap();
        db.conn()
            .execute_batch(
                "INSERT INTO permissions (name) VALUES ('Edit venues');
                 INSERT INTO roles (name) VALUES ('Admin'), ('Planner'), ('Viewer'), ('Auditor');",
            )
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn reconcile_inserts_and_deletes() {
        let db = db_with_permission().await;

        let diff = reconcile(db.conn(), &PERMISSION_ROLES, 1, None, &set(&[1, 2]))
            .await
            .unwrap();
        assert_eq!(diff.to_add, set(&[1, 2]));

        let diff = reconcile(db.conn(), &PERMISSION_ROLES, 1, None, &set(&[2, 3]))
            .await
            .unwrap();
        assert_eq!(diff.to_add, set(&[3]));
        assert_eq!(diff.to_remove, set(&[1]));

        let linked = linked_ids(db.conn(), &PERMISSION_ROLES, 1, None)
            .await
            .unwrap();
        assert_eq!(linked, set(&[2, 3]));
    }

    #[tokio::test]
    async fn unchanged_set_touches_nothing() {
        let db = db_with_permission().await;
        reconcile(db.conn(), &PERMISSION_ROLES, 1, None, &set(&[1, 4]))
            .await
            .unwrap();
        db.conn()
            .execute(
                "UPDATE role_permissions SET created_at = '2020-01-01T00:00:00+00:00'",
                (),
            )
            .await
            .unwrap();
        let before = db.conn().total_changes();

        let diff = reconcile(db.conn(), &PERMISSION_ROLES, 1, None, &set(&[1, 4]))
            .await
            .unwrap();
        assert!(diff.is_empty());
        assert_eq!(db.conn().total_changes(), before);
    }

    #[tokio::test]
    async fn scoped_links_are_partitioned() {
        let db = VenueDb::open_local(":memory:").await.unwrap();
        db.conn()
            .execute_batch(
                "INSERT INTO service_types (name) VALUES ('Catering');
                 INSERT INTO service_offerings (name) VALUES ('Gala');
                 INSERT INTO work_items (name) VALUES ('Setup'), ('Serve'), ('Cleanup');",
            )
            .await
            .unwrap();

        reconcile(db.conn(), &SERVICE_TYPE_WORK_ITEMS, 1, None, &set(&[1]))
            .await
            .unwrap();
        reconcile(db.conn(), &SERVICE_TYPE_WORK_ITEMS, 1, Some(1), &set(&[2, 3]))
            .await
            .unwrap();

        let own = linked_ids(db.conn(), &SERVICE_TYPE_WORK_ITEMS, 1, None)
            .await
            .unwrap();
        let in_offering = linked_ids(db.conn(), &SERVICE_TYPE_WORK_ITEMS, 1, Some(1))
            .await
            .unwrap();
        assert_eq!(own, set(&[1]));
        assert_eq!(in_offering, set(&[2, 3]));

        // Clearing the offering scope leaves the type's own items alone.
        reconcile(db.conn(), &SERVICE_TYPE_WORK_ITEMS, 1, Some(1), &set(&[]))
            .await
            .unwrap();
        let own = linked_ids(db.conn(), &SERVICE_TYPE_WORK_ITEMS, 1, None)
            .await
            .unwrap();
        assert_eq!(own, set(&[1]));
    }

    #[tokio::test]
    async fn reconcile_inside_failed_transaction_leaves_no_links() {
        let db = db_with_permission().await;
        let tx = db.begin().await.unwrap();
        let result: Result<_, DatabaseError> = async {
            reconcile(&tx, &PERMISSION_ROLES, 1, None, &set(&[1, 2])).await?;
            // role 99 does not exist; the foreign key rejects it
            reconcile(&tx, &PERMISSION_ROLES, 1, None, &set(&[1, 2, 99])).await
        }
        .await;
        assert!(crate::finish(tx, result).await.is_err());

        let linked = linked_ids(db.conn(), &PERMISSION_ROLES, 1, None)
            .await
            .unwrap();
        assert!(linked.is_empty());
    }
}
