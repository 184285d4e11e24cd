use std::sync::Arc;

use vh_core::entities::{Vendor, VendorDetail};
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, VendorFilter, VendorPayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::{Limits, ensure_exist, ensure_optional, found, page, touched};
use crate::error::ApiError;

const LABEL: &str = "Vendor";

#[derive(Clone)]
pub struct VendorService {
    db: Arc<VenueDb>,
    limits: Limits,
}

impl VendorService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(&self, mut request: ListRequest<VendorFilter>) -> Result<Page<Vendor>, ApiError> {
        self.limits.clamp(&mut request);
        let listing = self.db.list_vendors(&request).await?;
        Ok(page(listing, &request))
    }

    /// # Errors
    ///
    /// Returns `Validation` for more than one primary address and `NotFound`
    /// for an unknown profile, status or client.
    pub async fn create(&self, payload: &VendorPayload, actor: Option<i64>) -> Result<i64, ApiError> {
        check_addresses(payload)?;
        ensure_optional(&self.db, RefTable::Profiles, actor).await?;
        self.check_references(payload).await?;
        Ok(self.db.create_vendor(payload, actor).await?)
    }

    /// Addresses are replaced, client links reconciled.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the vendor or a referenced id does not exist.
    pub async fn edit(&self, id: i64, payload: &VendorPayload) -> Result<(), ApiError> {
        check_addresses(payload)?;
        self.check_references(payload).await?;
        touched(self.db.update_vendor(id, payload).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vendor does not exist.
    pub async fn view(&self, id: i64) -> Result<VendorDetail, ApiError> {
        found(self.db.find_vendor(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vendor does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_vendor_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vendor does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_vendor_archived(id, false).await?, LABEL, id)
    }

    async fn check_references(&self, payload: &VendorPayload) -> Result<(), ApiError> {
        ensure_optional(&self.db, RefTable::Statuses, payload.status_id).await?;
        ensure_exist(&self.db, RefTable::Clients, &payload.client_ids).await
    }
}

fn check_addresses(payload: &VendorPayload) -> Result<(), ApiError> {
    let primaries = payload.addresses.iter().filter(|a| a.is_primary).count();
    if primaries > 1 {
        return Err(ApiError::Validation(format!(
            "A vendor can have only one primary address, got {primaries}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{count, seeded};
    use pretty_assertions::assert_eq;
    use vh_core::requests::AddressInput;

    const LIMITS: Limits = Limits {
        default_limit: 10,
        max_limit: 100,
    };

    fn address(line: &str, is_primary: bool) -> AddressInput {
        AddressInput {
            address_line1: line.into(),
            is_primary,
            ..AddressInput::default()
        }
    }

    fn vendor(addresses: Vec<AddressInput>) -> VendorPayload {
        VendorPayload {
            name: "Lakeside Lodge".into(),
            email: Some("hello@lakeside.test".into()),
            addresses,
            client_ids: vec![1],
            ..VendorPayload::default()
        }
    }

    #[tokio::test]
    async fn two_primary_addresses_rejected() {
        let db = seeded().await;
        let service = VendorService::new(db.clone(), LIMITS);
        let payload = vendor(vec![address("1 Lake Rd", true), address("2 Lake Rd", true)]);
        let err = service.create(&payload, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(count(&db, "vendors").await, 1);
    }

    #[tokio::test]
    async fn edit_replaces_addresses() {
        let service = VendorService::new(seeded().await, LIMITS);
        let id = service
            .create(&vendor(vec![address("1 Lake Rd", true)]), Some(1))
            .await
            .unwrap();
        let mut payload = vendor(vec![address("9 Hill St", false), address("3 Main St", true)]);
        payload.client_ids = vec![2];
        service.edit(id, &payload).await.unwrap();

        let detail = service.view(id).await.unwrap();
        let lines: Vec<&str> = detail
            .addresses
            .iter()
            .map(|a| a.address_line1.as_str())
            .collect();
        assert_eq!(lines, vec!["3 Main St", "9 Hill St"]);
        assert_eq!(detail.client_ids, vec![2]);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let service = VendorService::new(seeded().await, LIMITS);
        let mut payload = vendor(vec![]);
        payload.client_ids = vec![1, 5];
        let err = service.create(&payload, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Client not found: 5");
    }
}
