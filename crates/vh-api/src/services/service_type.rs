use std::sync::Arc;

use vh_core::entities::{ServiceType, ServiceTypeDetail};
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, ServiceTypeFilter, ServiceTypePayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::{Limits, ensure_exist, ensure_optional, found, page, resolve_clone, touched};
use crate::error::ApiError;

const LABEL: &str = "Service type";

#[derive(Clone)]
pub struct ServiceTypeService {
    db: Arc<VenueDb>,
    limits: Limits,
}

impl ServiceTypeService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(
        &self,
        mut request: ListRequest<ServiceTypeFilter>,
    ) -> Result<Page<ServiceType>, ApiError> {
        self.limits.clamp(&mut request);
        let listing = self.db.list_service_types(&request).await?;
        Ok(page(listing, &request))
    }

    /// # Errors
    ///
    /// Returns `BadRequest` for a bad clone source, `Validation` if the name
    /// is taken, and `NotFound` for an unknown profile, status, offering or
    /// work item.
    pub async fn create(
        &self,
        mut payload: ServiceTypePayload,
        actor: Option<i64>,
    ) -> Result<i64, ApiError> {
        payload.clone_id = resolve_clone(
            &self.db,
            RefTable::ServiceTypes,
            payload.create_type,
            payload.clone_id,
        )
        .await?;
        self.check_name(&payload.name, None).await?;
        ensure_optional(&self.db, RefTable::Profiles, actor).await?;
        self.check_references(&payload).await?;
        Ok(self.db.create_service_type(&payload, actor).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the service type or a referenced id does not
    /// exist, and `Validation` if another service type has the name.
    pub async fn edit(&self, id: i64, payload: &ServiceTypePayload) -> Result<(), ApiError> {
        self.check_name(&payload.name, Some(id)).await?;
        self.check_references(payload).await?;
        touched(self.db.update_service_type(id, payload).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the service type does not exist.
    pub async fn view(&self, id: i64) -> Result<ServiceTypeDetail, ApiError> {
        found(self.db.find_service_type(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the service type does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_service_type_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the service type does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_service_type_archived(id, false).await?, LABEL, id)
    }

    async fn check_name(&self, name: &str, exclude: Option<i64>) -> Result<(), ApiError> {
        if self.db.service_type_name_exists(name, exclude).await? {
            return Err(ApiError::Validation(format!(
                "Service type name '{}' already exists",
                name.trim()
            )));
        }
        Ok(())
    }

    async fn check_references(&self, payload: &ServiceTypePayload) -> Result<(), ApiError> {
        ensure_optional(&self.db, RefTable::Statuses, payload.status_id).await?;
        ensure_exist(&self.db, RefTable::ServiceOfferings, &payload.service_offering_ids).await?;
        ensure_exist(&self.db, RefTable::WorkItems, &payload.work_item_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{count, seeded};
    use pretty_assertions::assert_eq;
    use vh_core::enums::CreateType;

    const LIMITS: Limits = Limits {
        default_limit: 10,
        max_limit: 100,
    };

    fn service_type(name: &str) -> ServiceTypePayload {
        ServiceTypePayload {
            name: name.into(),
            work_item_ids: vec![1, 3],
            ..ServiceTypePayload::default()
        }
    }

    #[tokio::test]
    async fn name_is_unique_ignoring_case() {
        let service = ServiceTypeService::new(seeded().await, LIMITS);
        service.create(service_type("Catering"), None).await.unwrap();
        let err = service.create(service_type("  catering "), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Service type name 'catering' already exists");
    }

    #[tokio::test]
    async fn edit_may_keep_its_own_name() {
        let service = ServiceTypeService::new(seeded().await, LIMITS);
        let id = service.create(service_type("Catering"), None).await.unwrap();
        let other = service.create(service_type("Lighting"), None).await.unwrap();
        service.edit(id, &service_type("CATERING")).await.unwrap();
        assert!(matches!(
            service.edit(other, &service_type("catering")).await.unwrap_err(),
            ApiError::Validation(_)
        ));
        assert_eq!(service.view(id).await.unwrap().service_type.name, "CATERING");
    }

    #[tokio::test]
    async fn clone_of_missing_type_writes_nothing() {
        let db = seeded().await;
        let service = ServiceTypeService::new(db.clone(), LIMITS);
        let mut payload = service_type("Catering");
        payload.create_type = CreateType::Clone;
        payload.clone_id = Some(12);
        let err = service.create(payload, None).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(count(&db, "service_types").await, 0);
        assert_eq!(count(&db, "service_type_work_items").await, 0);
    }

    #[tokio::test]
    async fn unknown_offering_is_not_found() {
        let service = ServiceTypeService::new(seeded().await, LIMITS);
        let mut payload = service_type("Catering");
        payload.service_offering_ids = vec![3];
        let err = service.create(payload, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Service offering not found: 3");
    }
}
