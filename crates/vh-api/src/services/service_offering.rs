use std::collections::BTreeSet;
use std::sync::Arc;

use vh_core::entities::{ServiceOffering, ServiceOfferingDetail};
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, ServiceOfferingFilter, ServiceOfferingPayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::{Limits, ensure_exist, ensure_optional, found, page, resolve_clone, touched};
use crate::error::ApiError;

const LABEL: &str = "Service offering";

#[derive(Clone)]
pub struct ServiceOfferingService {
    db: Arc<VenueDb>,
    limits: Limits,
}

impl ServiceOfferingService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(
        &self,
        mut request: ListRequest<ServiceOfferingFilter>,
    ) -> Result<Page<ServiceOffering>, ApiError> {
        self.limits.clamp(&mut request);
        let listing = self.db.list_service_offerings(&request).await?;
        Ok(page(listing, &request))
    }

    /// Create an offering with one link per service type and the work items
    /// chosen for each. A clone request must name an existing offering.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest("Invalid cloned id")` for a bad clone source,
    /// `Validation` for a service type listed twice, and `NotFound` for an
    /// unknown profile, status, service type or work item.
    pub async fn create(
        &self,
        mut payload: ServiceOfferingPayload,
        actor: Option<i64>,
    ) -> Result<i64, ApiError> {
        payload.clone_id = resolve_clone(
            &self.db,
            RefTable::ServiceOfferings,
            payload.create_type,
            payload.clone_id,
        )
        .await?;
        ensure_optional(&self.db, RefTable::Profiles, actor).await?;
        self.check_references(&payload).await?;
        let id = self.db.create_service_offering(&payload, actor).await?;
        if let Some(source) = payload.clone_id {
            tracing::info!(id, source, "service offering cloned");
        }
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the offering or a referenced id does not exist.
    pub async fn edit(&self, id: i64, payload: &ServiceOfferingPayload) -> Result<(), ApiError> {
        self.check_references(payload).await?;
        touched(self.db.update_service_offering(id, payload).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the offering does not exist.
    pub async fn view(&self, id: i64) -> Result<ServiceOfferingDetail, ApiError> {
        found(self.db.find_service_offering(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the offering does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_service_offering_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the offering does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_service_offering_archived(id, false).await?, LABEL, id)
    }

    async fn check_references(&self, payload: &ServiceOfferingPayload) -> Result<(), ApiError> {
        let mut types = BTreeSet::new();
        for link in &payload.service_type_data {
            if !types.insert(link.service_type_id) {
                return Err(ApiError::Validation(format!(
                    "Service type {} is listed more than once",
                    link.service_type_id
                )));
            }
        }
        let type_ids: Vec<i64> = types.into_iter().collect();
        let work_item_ids: Vec<i64> = payload
            .service_type_data
            .iter()
            .flat_map(|link| link.work_item_ids.iter().copied())
            .collect();
        ensure_optional(&self.db, RefTable::Statuses, payload.status_id).await?;
        ensure_exist(&self.db, RefTable::ServiceTypes, &type_ids).await?;
        ensure_exist(&self.db, RefTable::WorkItems, &work_item_ids).await
    }
}
