//! Permission repository: list, detail, transactional create/update with
//! role, client, menu and permission-group links.

use vh_core::entities::{Permission, PermissionDetail};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{ListRequest, PermissionFilter, PermissionPayload};

use super::{Listing, Source, fetch_one, fetch_page, id_set, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_i64, get_opt_string, now_text, parse_datetime};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::relations::{
    PERMISSION_CLIENTS, PERMISSION_GROUPS, PERMISSION_MENUS, PERMISSION_ROLES, linked_ids,
    reconcile,
};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "p.id, p.name, p.description, p.status_id, st.status_name, p.created_by, \
              p.created_at, p.updated_at, p.archived_at",
    from: "permissions p \
           LEFT JOIN statuses st ON st.id = p.status_id \
           LEFT JOIN profiles pr ON pr.id = p.created_by",
};

/// Sortable permission fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSort {
    Id,
    Name,
    Description,
    StatusName,
    CreatedByProfile,
    CreatedAt,
    UpdatedAt,
}

impl SortField for PermissionSort {
    const TIEBREAK: &'static str = "p.id";

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "statusName" => Some(Self::StatusName),
            "createdByProfile" => Some(Self::CreatedByProfile),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["p.id"],
            Self::Name => &["p.name"],
            Self::Description => &["p.description"],
            Self::StatusName => &["st.status_name"],
            Self::CreatedByProfile => &["pr.first_name", "pr.last_name"],
            Self::CreatedAt => &["p.created_at"],
            Self::UpdatedAt => &["p.updated_at"],
        }
    }
}

fn row_to_permission(row: &libsql::Row) -> Result<Permission, DatabaseError> {
    Ok(Permission {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        status_id: get_opt_i64(row, 3)?,
        status_name: get_opt_string(row, 4)?,
        created_by: get_opt_i64(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
        archived_at: get_opt_datetime(row, 8)?,
    })
}

async fn write_links(
    conn: &libsql::Connection,
    id: i64,
    payload: &PermissionPayload,
) -> Result<(), DatabaseError> {
    reconcile(conn, &PERMISSION_ROLES, id, None, &id_set(&payload.role_ids)).await?;
    reconcile(conn, &PERMISSION_CLIENTS, id, None, &id_set(&payload.client_ids)).await?;
    reconcile(conn, &PERMISSION_MENUS, id, None, &id_set(&payload.menu_ids)).await?;
    reconcile(
        conn,
        &PERMISSION_GROUPS,
        id,
        None,
        &id_set(&payload.permission_group_ids),
    )
    .await?;
    Ok(())
}

impl VenueDb {
    /// One page of permissions plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_permissions(
        &self,
        request: &ListRequest<PermissionFilter>,
    ) -> Result<Listing<Permission>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(request.search(), &["p.name", "p.description"], "p.id");
        if let Some(f) = &request.filter {
            filter
                .contains("p.name", f.name.as_deref())
                .in_ids("p.status_id", &f.status_ids)
                .exists_in(&PERMISSION_ROLES, "p.id", &f.role_ids)
                .archived("p.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order = order_clause::<PermissionSort>(request.sort_by.as_ref(), &[("p.id", SortOrder::Asc)]);
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_permission,
        )
        .await
    }

    /// A permission with its linked ids, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_permission(&self, id: i64) -> Result<Option<PermissionDetail>, DatabaseError> {
        let Some(permission) = fetch_one(self.conn(), &SOURCE, "p.id", id, row_to_permission).await?
        else {
            return Ok(None);
        };
        let conn = self.conn();
        Ok(Some(PermissionDetail {
            permission,
            role_ids: linked_ids(conn, &PERMISSION_ROLES, id, None).await?.into_iter().collect(),
            client_ids: linked_ids(conn, &PERMISSION_CLIENTS, id, None).await?.into_iter().collect(),
            menu_ids: linked_ids(conn, &PERMISSION_MENUS, id, None).await?.into_iter().collect(),
            permission_group_ids: linked_ids(conn, &PERMISSION_GROUPS, id, None)
                .await?
                .into_iter()
                .collect(),
        }))
    }

    /// Insert a permission and its links in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_permission(
        &self,
        payload: &PermissionPayload,
        created_by: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let now = now_text();
            tx.execute(
                "INSERT INTO permissions (name, description, status_id, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                libsql::params![
                    payload.name.trim(),
                    payload.description.as_deref(),
                    payload.status_id,
                    created_by,
                    now.as_str()
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            write_links(&tx, id, payload).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, "permission created");
        Ok(id)
    }

    /// Update a permission row and reconcile its links in one transaction.
    /// Returns `false` when no permission has that id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_permission(
        &self,
        id: i64,
        payload: &PermissionPayload,
    ) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE permissions SET name = ?1, description = ?2, status_id = ?3, updated_at = ?4
                     WHERE id = ?5",
                    libsql::params![
                        payload.name.trim(),
                        payload.description.as_deref(),
                        payload.status_id,
                        now_text(),
                        id
                    ],
                )
                .await?;
            if changed == 0 {
                return Ok(false);
            }
            write_links(&tx, id, payload).await?;
            Ok(true)
        }
        .await;
        let found = finish(tx, result).await?;
        if found {
            tracing::info!(id, "permission updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_permission_archived(&self, id: i64, archived: bool) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "permissions", id, archived).await
    }
}
