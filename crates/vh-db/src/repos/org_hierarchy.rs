//! Org hierarchy repository: client hierarchies and their ordered levels.

use vh_core::entities::{ClientHierarchy, ClientHierarchyDetail, HierarchyLevel};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{LevelInput, ListRequest, OrgHierarchyFilter, OrgHierarchyPayload};

use super::{Listing, Source, fetch_one, fetch_page, name_taken, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_datetime, get_opt_i64, get_opt_string, now_text, parse_date, parse_datetime,
};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "ch.id, ch.client_id, cl.name, ch.name, ch.description, ch.status_id, st.status_name, \
              ch.effective_date, ch.clone_id, ch.created_by, ch.created_at, ch.updated_at, ch.archived_at",
    from: "client_hierarchies ch \
           LEFT JOIN clients cl ON cl.id = ch.client_id \
           LEFT JOIN statuses st ON st.id = ch.status_id \
           LEFT JOIN profiles pr ON pr.id = ch.created_by",
};

/// `statusName asc, effectiveDate desc`
const DEFAULT_ORDER: &[(&str, SortOrder)] = &[
    ("st.status_name", SortOrder::Asc),
    ("ch.effective_date", SortOrder::Desc),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgHierarchySort {
    Id,
    Name,
    EffectiveDate,
    StatusName,
    ClientName,
    CreatedByProfile,
    CreatedAt,
    UpdatedAt,
}

impl SortField for OrgHierarchySort {
    const TIEBREAK: &'static str = "ch.id";

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "effectiveDate" => Some(Self::EffectiveDate),
            "statusName" => Some(Self::StatusName),
            "clientName" => Some(Self::ClientName),
            "createdByProfile" => Some(Self::CreatedByProfile),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["ch.id"],
            Self::Name => &["ch.name"],
            Self::EffectiveDate => &["ch.effective_date"],
            Self::StatusName => &["st.status_name"],
            Self::ClientName => &["cl.name"],
            Self::CreatedByProfile => &["pr.first_name", "pr.last_name"],
            Self::CreatedAt => &["ch.created_at"],
            Self::UpdatedAt => &["ch.updated_at"],
        }
    }
}

fn row_to_hierarchy(row: &libsql::Row) -> Result<ClientHierarchy, DatabaseError> {
    Ok(ClientHierarchy {
        id: row.get(0)?,
        client_id: row.get(1)?,
        client_name: get_opt_string(row, 2)?,
        name: row.get(3)?,
        description: get_opt_string(row, 4)?,
        status_id: get_opt_i64(row, 5)?,
        status_name: get_opt_string(row, 6)?,
        effective_date: parse_date(&row.get::<String>(7)?)?,
        clone_id: get_opt_i64(row, 8)?,
        created_by: get_opt_i64(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
        archived_at: get_opt_datetime(row, 12)?,
    })
}

async fn replace_levels(
    conn: &libsql::Connection,
    hierarchy_id: i64,
    levels: &[LevelInput],
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM hierarchy_levels WHERE client_hierarchy_id = ?1",
        [hierarchy_id],
    )
    .await?;
    let now = now_text();
    for level in levels {
        conn.execute(
            "INSERT INTO hierarchy_levels (client_hierarchy_id, level_name, level_order, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![
                hierarchy_id,
                level.level_name.trim(),
                level.level_order,
                now.as_str()
            ],
        )
        .await?;
    }
    Ok(())
}

async fn levels_for(
    conn: &libsql::Connection,
    hierarchy_id: i64,
) -> Result<Vec<HierarchyLevel>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, level_name, level_order FROM hierarchy_levels
             WHERE client_hierarchy_id = ?1 ORDER BY level_order, id",
            [hierarchy_id],
        )
        .await?;
    let mut levels = Vec::new();
    while let Some(row) = rows.next().await? {
        levels.push(HierarchyLevel {
            id: row.get(0)?,
            level_name: row.get(1)?,
            level_order: row.get(2)?,
        });
    }
    Ok(levels)
}

impl VenueDb {
    /// One page of hierarchies. Without a recognised sort field the order is
    /// status name ascending, then effective date descending.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_org_hierarchies(
        &self,
        request: &ListRequest<OrgHierarchyFilter>,
    ) -> Result<Listing<ClientHierarchy>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(
            request.search(),
            &["ch.name", "ch.description", "cl.name"],
            "ch.id",
        );
        if let Some(f) = &request.filter {
            filter
                .contains("ch.name", f.name.as_deref())
                .in_ids("ch.status_id", &f.status_ids)
                .in_ids("ch.client_id", &f.client_ids)
                .archived("ch.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order = order_clause::<OrgHierarchySort>(request.sort_by.as_ref(), DEFAULT_ORDER);
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_hierarchy,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_org_hierarchy(
        &self,
        id: i64,
    ) -> Result<Option<ClientHierarchyDetail>, DatabaseError> {
        let Some(hierarchy) = fetch_one(self.conn(), &SOURCE, "ch.id", id, row_to_hierarchy).await?
        else {
            return Ok(None);
        };
        Ok(Some(ClientHierarchyDetail {
            hierarchy,
            levels: levels_for(self.conn(), id).await?,
        }))
    }

    /// Whether another hierarchy already uses `name` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn org_hierarchy_name_exists(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        name_taken(self.conn(), "client_hierarchies", name, exclude_id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_org_hierarchy(
        &self,
        payload: &OrgHierarchyPayload,
        created_by: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO client_hierarchies
                    (client_id, name, description, status_id, effective_date, clone_id, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                libsql::params![
                    payload.client_id,
                    payload.name.trim(),
                    payload.description.as_deref(),
                    payload.status_id,
                    payload.effective_date.to_string(),
                    payload.clone_id,
                    created_by,
                    now_text()
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            replace_levels(&tx, id, &payload.levels).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, clone_id = ?payload.clone_id, "org hierarchy created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_org_hierarchy(
        &self,
        id: i64,
        payload: &OrgHierarchyPayload,
    ) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE client_hierarchies
                     SET client_id = ?1, name = ?2, description = ?3, status_id = ?4, effective_date = ?5, updated_at = ?6
                     WHERE id = ?7",
                    libsql::params![
                        payload.client_id,
                        payload.name.trim(),
                        payload.description.as_deref(),
                        payload.status_id,
                        payload.effective_date.to_string(),
                        now_text(),
                        id
                    ],
                )
                .await?;
            if changed == 0 {
                return Ok(false);
            }
            replace_levels(&tx, id, &payload.levels).await?;
            Ok(true)
        }
        .await;
        let found = finish(tx, result).await?;
        if found {
            tracing::info!(id, "org hierarchy updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_org_hierarchy_archived(&self, id: i64, archived: bool) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "client_hierarchies", id, archived).await
    }
}
