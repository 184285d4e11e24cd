//! Vendor room repository. Rooms own their questionnaire answers.

use vh_core::entities::{VendorRoom, VendorRoomDetail};
use vh_core::enums::{ArchivedFilter, SortOrder};
use vh_core::requests::{ListRequest, VendorRoomFilter, VendorRoomPayload};

use super::questionnaire::{NewAnswer, VENDOR_ROOM_ANSWERS, answers_for, insert_answers, replace_answers};
use super::{Listing, Source, fetch_one, fetch_page, set_archived};
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_i64, get_opt_string, now_text, parse_datetime};
use crate::query::{SortField, WhereBuilder, order_clause};
use crate::{VenueDb, finish};

const SOURCE: Source = Source {
    columns: "r.id, r.vendor_id, v.name, r.name, r.capacity, r.description, \
              r.created_at, r.updated_at, r.archived_at",
    from: "vendor_rooms r LEFT JOIN vendors v ON v.id = r.vendor_id",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorRoomSort {
    Id,
    Name,
    Capacity,
    VendorName,
    CreatedAt,
    UpdatedAt,
}

impl SortField for VendorRoomSort {
    const TIEBREAK: &'static str = "r.id";

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "capacity" => Some(Self::Capacity),
            "vendorName" => Some(Self::VendorName),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Id => &["r.id"],
            Self::Name => &["r.name"],
            Self::Capacity => &["r.capacity"],
            Self::VendorName => &["v.name"],
            Self::CreatedAt => &["r.created_at"],
            Self::UpdatedAt => &["r.updated_at"],
        }
    }
}

fn row_to_room(row: &libsql::Row) -> Result<VendorRoom, DatabaseError> {
    Ok(VendorRoom {
        id: row.get(0)?,
        vendor_id: row.get(1)?,
        vendor_name: get_opt_string(row, 2)?,
        name: row.get(3)?,
        capacity: get_opt_i64(row, 4)?,
        description: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
        archived_at: get_opt_datetime(row, 8)?,
    })
}

impl VenueDb {
    /// # Errors
    ///
    /// Returns `DatabaseError` if either query fails.
    pub async fn list_vendor_rooms(
        &self,
        request: &ListRequest<VendorRoomFilter>,
    ) -> Result<Listing<VendorRoom>, DatabaseError> {
        let mut filter = WhereBuilder::new();
        filter.search(request.search(), &["r.name", "r.description", "v.name"], "r.id");
        if let Some(f) = &request.filter {
            if let Some(vendor_id) = f.vendor_id {
                filter.eq("r.vendor_id", vendor_id);
            }
            filter
                .contains("r.name", f.name.as_deref())
                .archived("r.archived_at", ArchivedFilter::from_flag(f.archived));
        }
        let order =
            order_clause::<VendorRoomSort>(request.sort_by.as_ref(), &[("r.id", SortOrder::Asc)]);
        fetch_page(
            self.conn(),
            &SOURCE,
            &filter,
            &order,
            request.limit,
            request.offset,
            row_to_room,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_vendor_room(&self, id: i64) -> Result<Option<VendorRoomDetail>, DatabaseError> {
        let Some(room) = fetch_one(self.conn(), &SOURCE, "r.id", id, row_to_room).await? else {
            return Ok(None);
        };
        Ok(Some(VendorRoomDetail {
            room,
            answers: answers_for(self.conn(), &VENDOR_ROOM_ANSWERS, id).await?,
        }))
    }

    /// Insert a room and its validated answers in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn create_vendor_room(
        &self,
        payload: &VendorRoomPayload,
        answers: &[NewAnswer],
    ) -> Result<i64, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            tx.execute(
                "INSERT INTO vendor_rooms (vendor_id, name, capacity, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                libsql::params![
                    payload.vendor_id,
                    payload.name.trim(),
                    payload.capacity,
                    payload.description.as_deref(),
                    now_text()
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            insert_answers(&tx, &VENDOR_ROOM_ANSWERS, id, answers).await?;
            Ok(id)
        }
        .await;
        let id = finish(tx, result).await?;
        tracing::info!(id, answers = answers.len(), "vendor room created");
        Ok(id)
    }

    /// Update a room and replace the answers of the submitted questions.
    /// Returns `false` when no room has that id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is written.
    pub async fn update_vendor_room(
        &self,
        id: i64,
        payload: &VendorRoomPayload,
        answers: &[NewAnswer],
    ) -> Result<bool, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<_, DatabaseError> = async {
            let changed = tx
                .execute(
                    "UPDATE vendor_rooms SET vendor_id = ?1, name = ?2, capacity = ?3, description = ?4, updated_at = ?5
                     WHERE id = ?6",
                    libsql::params![
                        payload.vendor_id,
                        payload.name.trim(),
                        payload.capacity,
                        payload.description.as_deref(),
                        now_text(),
                        id
                    ],
                )
                .await?;
            if changed == 0 {
                return Ok(false);
            }
            replace_answers(&tx, &VENDOR_ROOM_ANSWERS, id, answers).await?;
            Ok(true)
        }
        .await;
        let found = finish(tx, result).await?;
        if found {
            tracing::info!(id, answers = answers.len(), "vendor room updated");
        }
        Ok(found)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn set_vendor_room_archived(&self, id: i64, archived: bool) -> Result<bool, DatabaseError> {
        set_archived(self.conn(), "vendor_rooms", id, archived).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_db;
    use pretty_assertions::assert_eq;
    use vh_core::enums::QuestionPurpose;
    use vh_core::requests::QuestionPayload;

    async fn db_with_questions() -> VenueDb {
        let db = seeded_db().await;
        for (text, options) in [("Seating style?", vec!["Theatre", "Banquet"]), ("Notes", vec![])] {
            db.create_question(&QuestionPayload {
                purpose: QuestionPurpose::VendorRoom,
                question_text: text.into(),
                sort_order: 0,
                options: options.into_iter().map(String::from).collect(),
                validations: vec![],
            })
            .await
            .unwrap();
        }
        db
    }

    fn room() -> VendorRoomPayload {
        VendorRoomPayload {
            vendor_id: 1,
            name: "Ballroom".into(),
            capacity: Some(250),
            description: None,
            answers: vec![],
        }
    }

    fn option_answer(option_id: i64) -> NewAnswer {
        NewAnswer {
            question_id: 1,
            question_option_id: Some(option_id),
            custom_value: String::new(),
            file_url: None,
        }
    }

    fn text_answer(text: &str) -> NewAnswer {
        NewAnswer {
            question_id: 2,
            question_option_id: None,
            custom_value: text.into(),
            file_url: None,
        }
    }

    #[tokio::test]
    async fn create_stores_answers_and_vendor_name() {
        let db = db_with_questions().await;
        let id = db
            .create_vendor_room(&room(), &[option_answer(1), option_answer(2), text_answer("Stage left")])
            .await
            .unwrap();

        let detail = db.find_vendor_room(id).await.unwrap().unwrap();
        assert_eq!(detail.room.vendor_name.as_deref(), Some("Harbor Hall"));
        assert_eq!(detail.room.capacity, Some(250));
        assert_eq!(detail.answers.len(), 3);
        assert_eq!(detail.answers[2].custom_value, "Stage left");
    }

    #[tokio::test]
    async fn update_replaces_only_submitted_questions() {
        let db = db_with_questions().await;
        let id = db
            .create_vendor_room(&room(), &[option_answer(1), text_answer("Stage left")])
            .await
            .unwrap();

        assert!(
            db.update_vendor_room(id, &room(), &[option_answer(2)])
                .await
                .unwrap()
        );
        let detail = db.find_vendor_room(id).await.unwrap().unwrap();
        let stored: Vec<(i64, Option<i64>)> = detail
            .answers
            .iter()
            .map(|a| (a.question_id, a.question_option_id))
            .collect();
        assert_eq!(stored, vec![(1, Some(2)), (2, None)]);
    }

    #[tokio::test]
    async fn list_filters_by_vendor_and_sorts_by_capacity() {
        let db = db_with_questions().await;
        db.create_vendor_room(&room(), &[]).await.unwrap();
        let mut small = room();
        small.name = "Library".into();
        small.capacity = Some(20);
        db.create_vendor_room(&small, &[]).await.unwrap();

        let request = ListRequest {
            filter: Some(VendorRoomFilter {
                vendor_id: Some(1),
                ..VendorRoomFilter::default()
            }),
            sort_by: Some(vh_core::requests::SortBy {
                field: "capacity".into(),
                order: SortOrder::Asc,
            }),
            ..ListRequest::default()
        };
        let (rows, total) = db.list_vendor_rooms(&request).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows[0].name, "Library");

        let request = ListRequest {
            filter: Some(VendorRoomFilter {
                vendor_id: Some(2),
                ..VendorRoomFilter::default()
            }),
            ..ListRequest::default()
        };
        let (rows, total) = db.list_vendor_rooms(&request).await.unwrap();
        assert_eq!(total, 0);
        assert!(rows.is_empty());
    }
}
