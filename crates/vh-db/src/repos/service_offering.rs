//! Service offering repository.
//!
//! An offering links service types through `service_type_offerings` and,
//! per linked type, chooses work items through `service_type_work_items`
//! rows scoped by the offering id.

use std::collections::BTreeSet;

use vh_core::entities::{ServiceOffering, ServiceOfferingDetail, ServiceTypeLink};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{ListRequest, ServiceOfferingFilter, ServiceOfferingPayload};

use super::{Listing, Source, fetch_one, fetch_page, id_set, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_i64, get_opt_string, now_text, parse_datetime};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::relations::{OFFERING_SERVICE_TYPES, SERVICE_TYPE_WORK_ITEMS, linked_ids, reconcile};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "so.id, so.name, so.description, so.status_id, st.status_name, so.clone_id, \
              so.created_by, so.created_at, so.updated_at, so.archived_at",
    from: "service_offerings so \
           LEFT JOIN statuses st ON st.id = so.status_id \
           LEFT JOIN profiles pr ON pr.id = so.created_by",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOfferingSort {
    Id,
    Name,
    Description,
    StatusName,
    CreatedByProfile,
    CreatedAt,
    UpdatedAt,
}

impl SortField for ServiceOfferingSort {
    const TIEBREAK: &'static str = "so.id";

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
            Self::Id => &["so.id"],
            Self::Name => &["so.name"],
            Self::Description => &["so.description"],
            Self::StatusName => &["st.status_name"],
            Self::CreatedByProfile => &["pr.first_name", "pr.last_name"],
            Self::CreatedAt => &["so.created_at"],
            Self::UpdatedAt => &["so.updated_at"],
        }
    }
}

fn row_to_offering(row: &libsql::Row) -> Result<ServiceOffering, DatabaseError> {
    Ok(ServiceOffering {
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

/// Converge the offering's service types and each type's scoped work items.
/// Types dropped from the offering lose their scoped work items too.
async fn write_service_type_data(
    conn: &libsql::Connection,
    offering_id: i64,
    data: &[ServiceTypeLink],
) -> Result<(), DatabaseError> {
    let desired: BTreeSet<i64> = data.iter().map(|link| link.service_type_id).collect();
    let diff = reconcile(conn, &OFFERING_SERVICE_TYPES, offering_id, None, &desired).await?;

    let none = BTreeSet::new();
    for removed in &diff.to_remove {
        reconcile(conn, &SERVICE_TYPE_WORK_ITEMS, *removed, Some(offering_id), &none).await?;
    }
    for link in data {
        reconcile(
            conn,
            &SERVICE_TYPE_WORK_ITEMS,
            link.service_type_id,
            Some(offering_id),
            &id_set(&link.work_item_ids),
        )
        .await?;
    }
    Ok(())
}

impl VenueDb {
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_service_offerings(
        &self,
        request: &ListRequest<ServiceOfferingFilter>,
    ) -> Result<Listing<ServiceOffering>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(request.search(), &["so.name", "so.description"], "so.id");
        if let Some(f) = &request.filter {
            filter
                .contains("so.name", f.name.as_deref())
                .in_ids("so.status_id", &f.status_ids)
                .exists_in(&OFFERING_SERVICE_TYPES, "so.id", &f.service_type_ids)
                .archived("so.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order = order_clause::<ServiceOfferingSort>(
            request.sort_by.as_ref(),
            &[("so.id", SortOrder::Asc)],
        );
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_offering,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_service_offering(
        &self,
        id: i64,
    ) -> Result<Option<ServiceOfferingDetail>, DatabaseError> {
        let Some(offering) = fetch_one(self.conn(), &SOURCE, "so.id", id, row_to_offering).await?
        else {
            return Ok(None);
        };
        let mut service_type_data = Vec::new();
        for service_type_id in linked_ids(self.conn(), &OFFERING_SERVICE_TYPES, id, None).await? {
            let work_item_ids = linked_ids(
                self.conn(),
                &SERVICE_TYPE_WORK_ITEMS,
                service_type_id,
                Some(id),
            )
            .await?;
            service_type_data.push(ServiceTypeLink {
                service_type_id,
                work_item_ids: work_item_ids.into_iter().collect(),
            });
        }
        Ok(Some(ServiceOfferingDetail {
            offering,
            service_type_data,
        }))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_service_offering(
        &self,
        payload: &ServiceOfferingPayload,
        created_by: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO service_offerings (name, description, status_id, clone_id, created_by, created_at, updated_at)
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
            write_service_type_data(&tx, id, &payload.service_type_data).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, clone_id = ?payload.clone_id, "service offering created");
        Ok(id)
    }

    /// Returns `false` when no offering has that id. `cloneId` is lineage set
    /// at creation and is not rewritten here.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_service_offering(
        &self,
        id: i64,
        payload: &ServiceOfferingPayload,
    ) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE service_offerings SET name = ?1, description = ?2, status_id = ?3, updated_at = ?4
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
            write_service_type_data(&tx, id, &payload.service_type_data).await?;
            Ok(true)
        }
        .await;
        let found = finish(tx, result).await?;
        if found {
            tracing::info!(id, "service offering updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_service_offering_archived(
        &self,
        id: i64,
        archived: bool,
    ) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "service_offerings", id, archived).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count_rows, seeded_db};
    use pretty_assertions::assert_eq;

    async fn db_with_types() -> VenueDb {
        let db = seeded_db().await;
        db.conn()
            .execute_batch("INSERT INTO service_types (name) VALUES ('Catering'), ('Lighting');")
            .await
            .unwrap();
        db
    }

    fn payload(data: Vec<ServiceTypeLink>) -> ServiceOfferingPayload {
        ServiceOfferingPayload {
            name: "Gala package".into(),
            service_type_data: data,
            ..ServiceOfferingPayload::default()
        }
    }

    fn link(service_type_id: i64, work_item_ids: &[i64]) -> ServiceTypeLink {
        ServiceTypeLink {
            service_type_id,
            work_item_ids: work_item_ids.to_vec(),
        }
    }

    #[tokio::test]
    async fn create_writes_one_type_link_and_scoped_work_items() {
        let db = db_with_types().await;
        let id = db
            .create_service_offering(&payload(vec![link(1, &[3, 4])]), None)
            .await
            .unwrap();

        assert_eq!(
            count_rows(&db, "service_type_offerings", &format!("service_offering_id = {id}")).await,
            1
        );
        assert_eq!(
            count_rows(
                &db,
                "service_type_work_items",
                &format!("service_type_id = 1 AND service_offering_id = {id} AND work_item_id IN (3, 4)")
            )
            .await,
            2
        );
        assert_eq!(count_rows(&db, "service_type_work_items", "").await, 2);
    }

    #[tokio::test]
    async fn find_groups_work_items_by_type() {
        let db = db_with_types().await;
        let id = db
            .create_service_offering(&payload(vec![link(1, &[3, 4]), link(2, &[1])]), Some(1))
            .await
            .unwrap();
        let detail = db.find_service_offering(id).await.unwrap().unwrap();
        assert_eq!(detail.service_type_data, vec![link(1, &[3, 4]), link(2, &[1])]);
        assert_eq!(detail.offering.created_by, Some(1));
    }

    #[tokio::test]
    async fn update_drops_removed_type_and_its_work_items() {
        let db = db_with_types().await;
        let id = db
            .create_service_offering(&payload(vec![link(1, &[3, 4]), link(2, &[1])]), None)
            .await
            .unwrap();

        assert!(
            db.update_service_offering(id, &payload(vec![link(1, &[4, 2])]))
                .await
                .unwrap()
        );
        let detail = db.find_service_offering(id).await.unwrap().unwrap();
        assert_eq!(detail.service_type_data, vec![link(1, &[2, 4])]);
        assert_eq!(count_rows(&db, "service_type_work_items", "service_type_id = 2").await, 0);
    }

    #[tokio::test]
    async fn unknown_work_item_rolls_back_everything() {
        let db = db_with_types().await;
        let result = db
            .create_service_offering(&payload(vec![link(1, &[3, 404])]), None)
            .await;
        assert!(result.is_err());
        assert_eq!(count_rows(&db, "service_offerings", "").await, 0);
        assert_eq!(count_rows(&db, "service_type_offerings", "").await, 0);
        assert_eq!(count_rows(&db, "service_type_work_items", "").await, 0);
    }

    #[tokio::test]
    async fn list_filters_by_service_type_and_keeps_archived_by_default() {
        let db = db_with_types().await;
        let first = db
            .create_service_offering(&payload(vec![link(1, &[])]), None)
            .await
            .unwrap();
        let second = db
            .create_service_offering(&payload(vec![link(2, &[])]), None)
            .await
            .unwrap();
        db.set_service_offering_archived(first, true).await.unwrap();

        let (rows, total) = db
            .list_service_offerings(&ListRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);

        let request = ListRequest {
            filter: Some(ServiceOfferingFilter {
                service_type_ids: vec![2],
                ..ServiceOfferingFilter::default()
            }),
            ..ListRequest::default()
        };
        let (rows, _) = db.list_service_offerings(&request).await.unwrap();
        assert_eq!(rows.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second]);
    }
}
