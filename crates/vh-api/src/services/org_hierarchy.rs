use std::collections::HashSet;
use std::sync::Arc;

use vh_core::entities::{ClientHierarchy, ClientHierarchyDetail};
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, OrgHierarchyFilter, OrgHierarchyPayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::{Limits, ensure_one, ensure_optional, found, page, resolve_clone, touched};
use crate::error::ApiError;

const LABEL: &str = "Org hierarchy";

#[derive(Clone)]
pub struct OrgHierarchyService {
    db: Arc<VenueDb>,
    limits: Limits,
}

impl OrgHierarchyService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// Ordered by status name, then newest effective date, unless the
    /// request names a sort field.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(
        &self,
        mut request: ListRequest<OrgHierarchyFilter>,
    ) -> Result<Page<ClientHierarchy>, ApiError> {
        self.limits.clamp(&mut request);
        let listing = self.db.list_org_hierarchies(&request).await?;
        Ok(page(listing, &request))
    }

    /// # Errors
    ///
    /// Returns `BadRequest` for a bad clone source, `Validation` for a taken
    /// name or repeated level order, and `NotFound` for an unknown profile,
    /// client or status.
    pub async fn create(
        &self,
        mut payload: OrgHierarchyPayload,
        actor: Option<i64>,
    ) -> Result<i64, ApiError> {
        payload.clone_id = resolve_clone(
            &self.db,
            RefTable::OrgHierarchies,
            payload.create_type,
            payload.clone_id,
        )
        .await?;
        self.check(&payload, None).await?;
        ensure_optional(&self.db, RefTable::Profiles, actor).await?;
        Ok(self.db.create_org_hierarchy(&payload, actor).await?)
    }

    /// Levels are replaced as a unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the hierarchy, client or status does not exist.
    pub async fn edit(&self, id: i64, payload: &OrgHierarchyPayload) -> Result<(), ApiError> {
        self.check(payload, Some(id)).await?;
        touched(self.db.update_org_hierarchy(id, payload).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the hierarchy does not exist.
    pub async fn view(&self, id: i64) -> Result<ClientHierarchyDetail, ApiError> {
        found(self.db.find_org_hierarchy(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the hierarchy does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_org_hierarchy_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the hierarchy does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_org_hierarchy_archived(id, false).await?, LABEL, id)
    }

    async fn check(&self, payload: &OrgHierarchyPayload, exclude: Option<i64>) -> Result<(), ApiError> {
        let mut orders = HashSet::new();
        if let Some(level) = payload.levels.iter().find(|l| !orders.insert(l.level_order)) {
            return Err(ApiError::Validation(format!(
                "Level order {} is used more than once",
                level.level_order
            )));
        }
        if self.db.org_hierarchy_name_exists(&payload.name, exclude).await? {
            return Err(ApiError::Validation(format!(
                "Org hierarchy name '{}' already exists",
                payload.name.trim()
            )));
        }
        ensure_one(&self.db, RefTable::Clients, payload.client_id).await?;
        ensure_optional(&self.db, RefTable::Statuses, payload.status_id).await
    }
}
