//! Request payloads accepted by the controllers.
//!
//! Payloads deserialize from camelCase JSON. `Validate` performs the
//! shape checks (required text, length limits, positive ids) that run before
//! any service logic; a failure is reported as a bad request.

mod list;
mod org_hierarchy;
mod permission;
mod questionnaire;
mod service_offering;
mod service_type;
mod vendor;
mod vendor_room;
mod venue;

pub use list::{ListRequest, SortBy};
pub use org_hierarchy::{LevelInput, OrgHierarchyFilter, OrgHierarchyPayload};
pub use permission::{PermissionFilter, PermissionPayload};
pub use questionnaire::{AnswerInput, QuestionPayload, QuestionQuery, ValidationInput};
pub use service_offering::{ServiceOfferingFilter, ServiceOfferingPayload};
pub use service_type::{ServiceTypeFilter, ServiceTypePayload};
pub use vendor::{AddressInput, VendorFilter, VendorPayload};
pub use vendor_room::{VendorRoomFilter, VendorRoomPayload};
pub use venue::{VenueChecklistFilter, VenueChecklistPayload};

use crate::errors::CoreError;

/// Maximum length of name-like fields.
pub const MAX_NAME_LEN: usize = 255;
/// Maximum length of description fields.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Shape validation run by the controllers before the service is called.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the offending field.
    fn validate(&self) -> Result<(), CoreError>;
}

pub(crate) fn require_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    optional_text(field, Some(value), max)
}

pub(crate) fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > max => Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn positive(field: &str, id: i64) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::Validation(format!("{field} must be a positive number")));
    }
    Ok(())
}

pub(crate) fn positive_opt(field: &str, id: Option<i64>) -> Result<(), CoreError> {
    id.map_or(Ok(()), |id| positive(field, id))
}

pub(crate) fn positive_all(field: &str, ids: &[i64]) -> Result<(), CoreError> {
    ids.iter().try_for_each(|id| positive(field, *id))
}
