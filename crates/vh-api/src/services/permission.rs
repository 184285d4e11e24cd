use std::sync::Arc;

use vh_core::entities::{Permission, PermissionDetail};
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, PermissionFilter, PermissionPayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::{Limits, ensure_exist, ensure_optional, found, page, touched};
use crate::error::ApiError;

const LABEL: &str = "Permission";

#[derive(Clone)]
pub struct PermissionService {
    db: Arc<VenueDb>,
    limits: Limits,
}

impl PermissionService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// A request without a filter object lists live permissions only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(
        &self,
        mut request: ListRequest<PermissionFilter>,
    ) -> Result<Page<Permission>, ApiError> {
        self.limits.clamp(&mut request);
        if request.filter.is_none() {
            request.filter = Some(PermissionFilter::live_only());
        }
        let listing = self.db.list_permissions(&request).await?;
        Ok(page(listing, &request))
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the acting profile, status or any linked id
    /// does not exist.
    pub async fn create(
        &self,
        payload: &PermissionPayload,
        actor: Option<i64>,
    ) -> Result<i64, ApiError> {
        ensure_optional(&self.db, RefTable::Profiles, actor).await?;
        self.check_references(payload).await?;
        Ok(self.db.create_permission(payload, actor).await?)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the permission or a linked id does not exist.
    pub async fn edit(&self, id: i64, payload: &PermissionPayload) -> Result<(), ApiError> {
        self.check_references(payload).await?;
        touched(self.db.update_permission(id, payload).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the permission does not exist.
    pub async fn view(&self, id: i64) -> Result<PermissionDetail, ApiError> {
        found(self.db.find_permission(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the permission does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_permission_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the permission does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_permission_archived(id, false).await?, LABEL, id)
    }

    async fn check_references(&self, payload: &PermissionPayload) -> Result<(), ApiError> {
        ensure_optional(&self.db, RefTable::Statuses, payload.status_id).await?;
        ensure_exist(&self.db, RefTable::Roles, &payload.role_ids).await?;
        ensure_exist(&self.db, RefTable::Clients, &payload.client_ids).await?;
        ensure_exist(&self.db, RefTable::Menus, &payload.menu_ids).await?;
        ensure_exist(&self.db, RefTable::PermissionGroups, &payload.permission_group_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::seeded;
    use pretty_assertions::assert_eq;

    const LIMITS: Limits = Limits {
        default_limit: 10,
        max_limit: 100,
    };

    fn payload(name: &str) -> PermissionPayload {
        PermissionPayload {
            name: name.into(),
            role_ids: vec![1, 2],
            ..PermissionPayload::default()
        }
    }

    #[tokio::test]
    async fn list_without_filter_hides_archived() {
        let service = PermissionService::new(seeded().await, LIMITS);
        let live = service.create(&payload("venue.read"), Some(1)).await.unwrap();
        let gone = service.create(&payload("venue.write"), Some(1)).await.unwrap();
        service.archive(gone).await.unwrap();

        let page = service.list(ListRequest::default()).await.unwrap();
        assert_eq!(page.total_amount, 1);
        assert_eq!(page.rows[0].id, live);

        let everything = ListRequest {
            filter: Some(PermissionFilter::default()),
            ..ListRequest::default()
        };
        assert_eq!(service.list(everything).await.unwrap().total_amount, 2);
    }

    #[tokio::test]
    async fn unknown_role_is_not_found() {
        let service = PermissionService::new(seeded().await, LIMITS);
        let mut body = payload("venue.read");
        body.role_ids = vec![1, 42];
        let err = service.create(&body, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Role not found: 42");
    }

    #[tokio::test]
    async fn unknown_actor_is_not_found() {
        let service = PermissionService::new(seeded().await, LIMITS);
        let err = service.create(&payload("venue.read"), Some(9)).await.unwrap_err();
        assert_eq!(err.to_string(), "Profile 9 not found");
    }

    #[tokio::test]
    async fn edit_and_archive_missing_is_not_found() {
        let service = PermissionService::new(seeded().await, LIMITS);
        assert!(matches!(
            service.edit(5, &payload("x")).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(service.archive(5).await.unwrap_err(), ApiError::NotFound(_)));
        assert!(matches!(service.view(5).await.unwrap_err(), ApiError::NotFound(_)));
    }
}
