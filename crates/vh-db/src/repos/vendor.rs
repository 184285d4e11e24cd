//! Vendor repository: vendor rows, owned addresses, client links.

use vh_core::entities::{Vendor, VendorAddress, VendorDetail};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{AddressInput, ListRequest, VendorFilter, VendorPayload};

use super::{Listing, Source, fetch_one, fetch_page, id_set, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_i64, get_opt_string, now_text, parse_datetime};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::relations::{VENDOR_CLIENTS, linked_ids, reconcile};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "v.id, v.name, v.email, v.phone, v.status_id, st.status_name, v.created_by, \
              v.created_at, v.updated_at, v.archived_at",
    from: "vendors v \
           LEFT JOIN statuses st ON st.id = v.status_id \
           LEFT JOIN profiles pr ON pr.id = v.created_by",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorSort {
    Id,
    Name,
    Email,
    StatusName,
    CreatedByProfile,
    CreatedAt,
    UpdatedAt,
}

impl SortField for VendorSort {
    const TIEBREAK: &'static str = "v.id";

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "statusName" => Some(Self::StatusName),
            "createdByProfile" => Some(Self::CreatedByProfile),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["v.id"],
            Self::Name => &["v.name"],
            Self::Email => &["v.email"],
            Self::StatusName => &["st.status_name"],
            Self::CreatedByProfile => &["pr.first_name", "pr.last_name"],
            Self::CreatedAt => &["v.created_at"],
            Self::UpdatedAt => &["v.updated_at"],
        }
    }
}

fn row_to_vendor(row: &libsql::Row) -> Result<Vendor, DatabaseError> {
    Ok(Vendor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: get_opt_string(row, 2)?,
        phone: get_opt_string(row, 3)?,
        status_id: get_opt_i64(row, 4)?,
        status_name: get_opt_string(row, 5)?,
        created_by: get_opt_i64(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
        archived_at: get_opt_datetime(row, 9)?,
    })
}

/// Replace the vendor's addresses with `addresses`.
async fn replace_addresses(
    conn: &libsql::Connection,
    vendor_id: i64,
    addresses: &[AddressInput],
) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM vendor_addresses WHERE vendor_id = ?1", [vendor_id])
        .await?;
    let now = now_text();
    for address in addresses {
        conn.execute(
            "INSERT INTO vendor_addresses
                (vendor_id, address_line1, address_line2, city, state, postal_code, country, is_primary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            libsql::params![
                vendor_id,
                address.address_line1.trim(),
                address.address_line2.as_deref(),
                address.city.as_deref(),
                address.state.as_deref(),
                address.postal_code.as_deref(),
                address.country.as_deref(),
                i64::from(address.is_primary),
                now.as_str()
            ],
        )
        .await?;
    }
    Ok(())
}

async fn addresses_for(
    conn: &libsql::Connection,
    vendor_id: i64,
) -> Result<Vec<VendorAddress>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, address_line1, address_line2, city, state, postal_code, country, is_primary
             FROM vendor_addresses WHERE vendor_id = ?1 ORDER BY is_primary DESC, id",
            [vendor_id],
        )
        .await?;
    let mut addresses = Vec::new();
    while let Some(row) = rows.next().await? {
        addresses.push(VendorAddress {
            id: row.get(0)?,
            address_line1: row.get(1)?,
            address_line2: get_opt_string(&row, 2)?,
            city: get_opt_string(&row, 3)?,
            state: get_opt_string(&row, 4)?,
            postal_code: get_opt_string(&row, 5)?,
            country: get_opt_string(&row, 6)?,
            is_primary: row.get::<i64>(7)? != 0,
        });
    }
    Ok(addresses)
}

impl VenueDb {
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_vendors(
        &self,
        request: &ListRequest<VendorFilter>,
    ) -> Result<Listing<Vendor>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(request.search(), &["v.name", "v.email", "v.phone"], "v.id");
        if let Some(f) = &request.filter {
            filter
                .contains("v.name", f.name.as_deref())
                .in_ids("v.status_id", &f.status_ids)
                .exists_in(&VENDOR_CLIENTS, "v.id", &f.client_ids)
                .archived("v.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order = order_clause::<VendorSort>(request.sort_by.as_ref(), &[("v.id", SortOrder::Asc)]);
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_vendor,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_vendor(&self, id: i64) -> Result<Option<VendorDetail>, DatabaseError> {
        let Some(vendor) = fetch_one(self.conn(), &SOURCE, "v.id", id, row_to_vendor).await? else {
            return Ok(None);
        };
        Ok(Some(VendorDetail {
            vendor,
            addresses: addresses_for(self.conn(), id).await?,
            client_ids: linked_ids(self.conn(), &VENDOR_CLIENTS, id, None)
                .await?
                .into_iter()
                .collect(),
        }))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_vendor(
        &self,
        payload: &VendorPayload,
        created_by: Option<i64>,
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO vendors (name, email, phone, status_id, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                libsql::params![
                    payload.name.trim(),
                    payload.email.as_deref(),
                    payload.phone.as_deref(),
                    payload.status_id,
                    created_by,
                    now_text()
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            replace_addresses(&tx, id, &payload.addresses).await?;
            reconcile(&tx, &VENDOR_CLIENTS, id, None, &id_set(&payload.client_ids)).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, "vendor created");
        Ok(id)
    }

    /// Update the vendor row, replace its addresses and reconcile client
    /// links. Returns `false` when no vendor has that id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_vendor(&self, id: i64, payload: &VendorPayload) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE vendors SET name = ?1, email = ?2, phone = ?3, status_id = ?4, updated_at = ?5
                     WHERE id = ?6",
                    libsql::params![
                        payload.name.trim(),
                        payload.email.as_deref(),
                        payload.phone.as_deref(),
                        payload.status_id,
                        now_text(),
                        id
                    ],
                )
                .await?;
            if changed == 0 {
                return Ok(false);
            }
            replace_addresses(&tx, id, &payload.addresses).await?;
            reconcile(&tx, &VENDOR_CLIENTS, id, None, &id_set(&payload.client_ids)).await?;
            Ok(true)
        }
        .await;
        let found = finish(tx, result).await?;
        if found {
            tracing::info!(id, "vendor updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_vendor_archived(&self, id: i64, archived: bool) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "vendors", id, archived).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count_rows, seeded_db};
    use pretty_assertions::assert_eq;

    fn address(line: &str, is_primary: bool) -> AddressInput {
        AddressInput {
            address_line1: line.into(),
            city: Some("Lisbon".into()),
            is_primary,
            ..AddressInput::default()
        }
    }

    fn payload() -> VendorPayload {
        VendorPayload {
            name: "Riverside Lofts".into(),
            email: Some("hello@riverside.test".into()),
            phone: None,
            status_id: Some(1),
            addresses: vec![address("1 Dock Road", false), address("2 Quay Street", true)],
            client_ids: vec![1, 2],
        }
    }

    #[tokio::test]
    async fn create_writes_addresses_and_clients() {
        let db = seeded_db().await;
        let id = db.create_vendor(&payload(), Some(1)).await.unwrap();
        let detail = db.find_vendor(id).await.unwrap().unwrap();

        assert_eq!(detail.vendor.name, "Riverside Lofts");
        assert_eq!(detail.client_ids, vec![1, 2]);
        assert_eq!(detail.addresses.len(), 2);
        // primary address is listed first
        assert!(detail.addresses[0].is_primary);
        assert_eq!(detail.addresses[0].address_line1, "2 Quay Street");
    }

    #[tokio::test]
    async fn update_replaces_addresses() {
        let db = seeded_db().await;
        let id = db.create_vendor(&payload(), None).await.unwrap();

        let mut edit = payload();
        edit.addresses = vec![address("9 New Lane", true)];
        edit.client_ids = vec![2];
        assert!(db.update_vendor(id, &edit).await.unwrap());

        let detail = db.find_vendor(id).await.unwrap().unwrap();
        assert_eq!(detail.addresses.len(), 1);
        assert_eq!(detail.addresses[0].address_line1, "9 New Lane");
        assert_eq!(detail.client_ids, vec![2]);
        assert_eq!(
            count_rows(&db, "vendor_addresses", &format!("vendor_id = {id}")).await,
            1
        );
    }

    #[tokio::test]
    async fn list_filters_by_client() {
        let db = seeded_db().await;
        let mut only_globex = payload();
        only_globex.client_ids = vec![2];
        let id = db.create_vendor(&only_globex, None).await.unwrap();

        let request = ListRequest {
            filter: Some(VendorFilter {
                client_ids: vec![2],
                ..VendorFilter::default()
            }),
            ..ListRequest::default()
        };
        let (rows, total) = db.list_vendors(&request).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, id);

        // seeded vendor plus the new one
        let (_, total) = db.list_vendors(&ListRequest::default()).await.unwrap();
        assert_eq!(total, 2);
    }
}
