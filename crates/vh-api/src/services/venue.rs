use std::sync::Arc;

use vh_core::entities::{VendorVenue, VenueChecklistDetail};
use vh_core::enums::QuestionPurpose;
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, VenueChecklistFilter, VenueChecklistPayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::questionnaire::QuestionnaireService;
use super::{Limits, ensure_one, found, page, touched};
use crate::error::ApiError;

const LABEL: &str = "Venue checklist";

#[derive(Clone)]
pub struct VenueChecklistService {
    db: Arc<VenueDb>,
    questionnaire: QuestionnaireService,
    limits: Limits,
}

impl VenueChecklistService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, questionnaire: QuestionnaireService, limits: Limits) -> Self {
        Self {
            db,
            questionnaire,
            limits,
        }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(
        &self,
        mut request: ListRequest<VenueChecklistFilter>,
    ) -> Result<Page<VendorVenue>, ApiError> {
        self.limits.clamp(&mut request);
        let listing = self.db.list_venue_checklists(&request).await?;
        Ok(page(listing, &request))
    }

    /// # Errors
    ///
    /// Returns `NotFound` for an unknown vendor or question, `Validation`
    /// for a rejected answer, and `ContentLoading` if an upload fails.
    pub async fn create(&self, payload: &VenueChecklistPayload) -> Result<i64, ApiError> {
        ensure_one(&self.db, RefTable::Vendors, payload.vendor_id).await?;
        let prepared = self
            .questionnaire
            .prepare(QuestionPurpose::VenueChecklist, &payload.answers)
            .await?;
        let result = self.db.create_venue_checklist(payload, &prepared.answers).await;
        if result.is_err() {
            self.questionnaire.discard(&prepared).await;
        }
        Ok(result?)
    }

    /// Answers to questions not in the payload are kept.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the checklist, vendor or a question does not
    /// exist.
    pub async fn edit(&self, id: i64, payload: &VenueChecklistPayload) -> Result<(), ApiError> {
        if self.db.find_venue_checklist(id).await?.is_none() {
            return Err(ApiError::not_found(LABEL, id));
        }
        ensure_one(&self.db, RefTable::Vendors, payload.vendor_id).await?;
        let prepared = self
            .questionnaire
            .prepare(QuestionPurpose::VenueChecklist, &payload.answers)
            .await?;
        let result = self
            .db
            .update_venue_checklist(id, payload, &prepared.answers)
            .await;
        if !matches!(result, Ok(true)) {
            self.questionnaire.discard(&prepared).await;
        }
        touched(result?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the checklist does not exist.
    pub async fn view(&self, id: i64) -> Result<VenueChecklistDetail, ApiError> {
        found(self.db.find_venue_checklist(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the checklist does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_venue_checklist_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the checklist does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_venue_checklist_archived(id, false).await?, LABEL, id)
    }
}
