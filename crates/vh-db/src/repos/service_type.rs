//! Service type repository.

use std::collections::BTreeSet;

use vh_core::entities::{ServiceType, ServiceTypeDetail};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{ListRequest, ServiceTypeFilter, ServiceTypePayload};

use super::{Listing, Source, fetch_one, fetch_page, id_set, name_taken, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_i64, get_opt_string, now_text, parse_datetime};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::relations::{SERVICE_TYPE_OFFERINGS, SERVICE_TYPE_WORK_ITEMS, linked_ids, reconcile};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "s.id, s.name, s.description, s.status_id, st.status_name, s.clone_id, \
              s.created_by, s.created_at, s.updated_at, s.archived_at",
    from: "service_types s \
           LEFT JOIN statuses st ON st.id = s.status_id \
           LEFT JOIN profiles pr ON pr.id = s.created_by",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceTypeSort {
    Id,
    Name,
    Description,
    StatusName,
    CreatedByProfile,
    CreatedAt,
    UpdatedAt,
}

impl SortField for ServiceTypeSort {
    const TIEBREAK: &'static str = "s.id";

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
            Self::Id => &["s.id"],
            Self::Name => &["s.name"],
            Self::Description => &["s.description"],
            Self::StatusName => &["st.status_name"],
            Self::CreatedByProfile => &["pr.first_name", "pr.last_name"],
            Self::CreatedAt => &["s.created_at"],
            Self::UpdatedAt => &["s.updated_at"],
        }
    }
}

fn row_to_service_type(row: &libsql::Row) -> Result<ServiceType, DatabaseError> {
    Ok(ServiceType {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        status_id: get_opt_i64(row, 3)?,
        status_name: get_opt_string(row, 4)?,
        clone_id: get_opt_i64(row, 5)?,
        created_by: get_opt_i64(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
        archived_at: get_opt_datetime(row, 9)?,
    })
}

/// Converge offering links and the type's own (unscoped) work items.
/// Leaving an offering also clears the work items chosen within it.
async fn write_links(
    conn: &libsql::Connection,
    id: i64,
    payload: &ServiceTypePayload,
) -> Result<(), DatabaseError> {
    let diff = reconcile(
        conn,
        &SERVICE_TYPE_OFFERINGS,
        id,
        None,
        &id_set(&payload.service_offering_ids),
    )
    .await?;
    let none = BTreeSet::new();
    for offering_id in &diff.to_remove {
        reconcile(conn, &SERVICE_TYPE_WORK_ITEMS, id, Some(*offering_id), &none).await?;
    }
    reconcile(
        conn,
        &SERVICE_TYPE_WORK_ITEMS,
        id,
        None,
        &id_set(&payload.work_item_ids),
    )
    .await?;
    Ok(())
}

impl VenueDb {
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_service_types(
        &self,
        request: &ListRequest<ServiceTypeFilter>,
    ) -> Result<Listing<ServiceType>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(request.search(), &["s.name", "s.description"], "s.id");
        if let Some(f) = &request.filter {
            filter
                .contains("s.name", f.name.as_deref())
                .in_ids("s.status_id", &f.status_ids)
                .exists_in(&SERVICE_TYPE_WORK_ITEMS, "s.id", &f.work_item_ids)
                .archived("s.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order =
            order_clause::<ServiceTypeSort>(request.sort_by.as_ref(), &[("s.id", SortOrder::Asc)]);
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_service_type,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_service_type(&self, id: i64) -> Result<Option<ServiceTypeDetail>, DatabaseError> {
        let Some(service_type) =
            fetch_one(self.conn(), &SOURCE, "s.id", id, row_to_service_type).await?
        else {
            return Ok(None);
        };
        Ok(Some(ServiceTypeDetail {
            service_type,
            service_offering_ids: linked_ids(self.conn(), &SERVICE_TYPE_OFFERINGS, id, None)
                .await?
                .into_iter()
                .collect(),
            work_item_ids: linked_ids(self.conn(), &SERVICE_TYPE_WORK_ITEMS, id, None)
                .await?
                .into_iter()
                .collect(),
        }))
    }

    /// Whether another service type already uses `name` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn service_type_name_exists(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        name_taken(self.conn(), "service_types", name, exclude_id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_service_type(
        &self,
        payload: &ServiceTypePayload,
        created_by: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO service_types (name, description, status_id, clone_id, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                libsql::params![
                    payload.name.trim(),
                    payload.description.as_deref(),
                    payload.status_id,
                    payload.clone_id,
                    created_by,
                    now_text()
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            write_links(&tx, id, payload).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, clone_id = ?payload.clone_id, "service type created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_service_type(
        &self,
        id: i64,
        payload: &ServiceTypePayload,
    ) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE service_types SET name = ?1, description = ?2, status_id = ?3, updated_at = ?4
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
            tracing::info!(id, "service type updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_service_type_archived(&self, id: i64, archived: bool) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "service_types", id, archived).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count_rows, seeded_db};
    use pretty_assertions::assert_eq;
    use vh_core::entities::ServiceTypeLink;
    use vh_core::requests::ServiceOfferingPayload;

    fn payload(name: &str) -> ServiceTypePayload {
        ServiceTypePayload {
            name: name.into(),
            work_item_ids: vec![1, 2],
            ..ServiceTypePayload::default()
        }
    }

    #[tokio::test]
    async fn create_links_own_work_items_unscoped() {
        let db = seeded_db().await;
        let id = db.create_service_type(&payload("Catering"), None).await.unwrap();
        let detail = db.find_service_type(id).await.unwrap().unwrap();
        assert_eq!(detail.work_item_ids, vec![1, 2]);
        assert!(detail.service_offering_ids.is_empty());
        assert_eq!(
            count_rows(&db, "service_type_work_items", "service_offering_id IS NULL").await,
            2
        );
    }

    #[tokio::test]
    async fn name_exists_is_case_insensitive_and_excludes_self() {
        let db = seeded_db().await;
        let id = db.create_service_type(&payload("Catering"), None).await.unwrap();
        assert!(db.service_type_name_exists("  catering ", None).await.unwrap());
        assert!(!db.service_type_name_exists("CATERING", Some(id)).await.unwrap());
        assert!(!db.service_type_name_exists("Lighting", None).await.unwrap());
    }

    #[tokio::test]
    async fn leaving_offering_clears_scoped_work_items() {
        let db = seeded_db().await;
        let type_id = db.create_service_type(&payload("Catering"), None).await.unwrap();
        let offering_id = db
            .create_service_offering(
                &ServiceOfferingPayload {
                    name: "Gala".into(),
                    service_type_data: vec![ServiceTypeLink {
                        service_type_id: type_id,
                        work_item_ids: vec![3],
                    }],
                    ..ServiceOfferingPayload::default()
                },
                None,
            )
            .await
            .unwrap();

        let detail = db.find_service_type(type_id).await.unwrap().unwrap();
        assert_eq!(detail.service_offering_ids, vec![offering_id]);
        // own work items are untouched by the offering's scoped rows
        assert_eq!(detail.work_item_ids, vec![1, 2]);

        let mut edit = payload("Catering");
        edit.service_offering_ids = vec![];
        assert!(db.update_service_type(type_id, &edit).await.unwrap());
        assert_eq!(
            count_rows(&db, "service_type_work_items", "service_offering_id IS NOT NULL").await,
            0
        );
        assert_eq!(count_rows(&db, "service_type_offerings", "").await, 0);
    }

    #[tokio::test]
    async fn list_filters_by_own_work_item() {
        let db = seeded_db().await;
        db.create_service_type(&payload("Catering"), None).await.unwrap();
        let mut other = payload("Lighting");
        other.work_item_ids = vec![4];
        let lighting = db.create_service_type(&other, None).await.unwrap();

        let request = ListRequest {
            filter: Some(ServiceTypeFilter {
                work_item_ids: vec![4],
                ..ServiceTypeFilter::default()
            }),
            ..ListRequest::default()
        };
        let (rows, total) = db.list_service_types(&request).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, lighting);
    }
}
