//! Venue checklist repository: vendor venues and their checklist answers.

use vh_core::entities::{VendorVenue, VenueChecklistDetail};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{ListRequest, VenueChecklistFilter, VenueChecklistPayload};

use super::questionnaire::{
    NewAnswer, VENUE_CHECKLIST_ANSWERS, answers_for, insert_answers, replace_answers,
};
use super::{Listing, Source, fetch_one, fetch_page, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_string, now_text, parse_datetime};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "vv.id, vv.vendor_id, v.name, vv.name, vv.description, \
              vv.created_at, vv.updated_at, vv.archived_at",
    from: "vendor_venues vv LEFT JOIN vendors v ON v.id = vv.vendor_id",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueSort {
    Id,
    Name,
    VendorName,
    CreatedAt,
    UpdatedAt,
}

impl SortField for VenueSort {
    const TIEBREAK: &'static str = "vv.id";

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "vendorName" => Some(Self::VendorName),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["vv.id"],
            Self::Name => &["vv.name"],
            Self::VendorName => &["v.name"],
            Self::CreatedAt => &["vv.created_at"],
            Self::UpdatedAt => &["vv.updated_at"],
        }
    }
}

fn row_to_venue(row: &libsql::Row) -> Result<VendorVenue, DatabaseError> {
    Ok(VendorVenue {
        id: row.get(0)?,
        vendor_id: row.get(1)?,
        vendor_name: get_opt_string(row, 2)?,
        name: row.get(3)?,
        description: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
        archived_at: get_opt_datetime(row, 7)?,
    })
}

impl VenueDb {
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_venue_checklists(
        &self,
        request: &ListRequest<VenueChecklistFilter>,
    ) -> Result<Listing<VendorVenue>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(request.search(), &["vv.name", "vv.description", "v.name"], "vv.id");
        if let Some(f) = &request.filter {
            if let Some(vendor_id) = f.vendor_id {
                filter.eq("vv.vendor_id", vendor_id);
            }
            filter
                .contains("vv.name", f.name.as_deref())
                .archived("vv.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order = order_clause::<VenueSort>(request.sort_by.as_ref(), &[("vv.id", SortOrder::Asc)]);
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_venue,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_venue_checklist(
        &self,
        id: i64,
    ) -> Result<Option<VenueChecklistDetail>, DatabaseError> {
        let Some(venue) = fetch_one(self.conn(), &SOURCE, "vv.id", id, row_to_venue).await? else {
            return Ok(None);
        };
        Ok(Some(VenueChecklistDetail {
            venue,
            answers: answers_for(self.conn(), &VENUE_CHECKLIST_ANSWERS, id).await?,
        }))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_venue_checklist(
        &self,
        payload: &VenueChecklistPayload,
        answers: &[NewAnswer],
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO vendor_venues (vendor_id, name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                libsql::params![
                    payload.vendor_id,
                    payload.name.trim(),
                    payload.description.as_deref(),
                    now_text()
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            insert_answers(&tx, &VENUE_CHECKLIST_ANSWERS, id, answers).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, answers = answers.len(), "venue checklist created");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_venue_checklist(
        &self,
        id: i64,
        payload: &VenueChecklistPayload,
        answers: &[NewAnswer],
    ) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE vendor_venues SET vendor_id = ?1, name = ?2, description = ?3, updated_at = ?4
                     WHERE id = ?5",
                    libsql::params![
                        payload.vendor_id,
                        payload.name.trim(),
                        payload.description.as_deref(),
                        now_text(),
                        id
                    ],
                )
                .await?;
            if changed == 0 {
                return Ok(false);
            }
            replace_answers(&tx, &VENUE_CHECKLIST_ANSWERS, id, answers).await?;
            Ok(true)
        }
        .await;
        let found = finish(tx, result).await?;
        if found {
            tracing::info!(id, answers = answers.len(), "venue checklist updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_venue_checklist_archived(
        &self,
        id: i64,
        archived: bool,
    ) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "vendor_venues", id, archived).await
    }
}
