use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN, Validate, optional_text, positive_all, positive_opt, require_text};
use crate::enums::ArchivedFilter;
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFilter {
    pub name: Option<String>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
    pub archived: Option<i64>,
}

impl PermissionFilter {
    /// Filter applied when a list request carries no filter object.
    #[must_use]
    pub fn live_only() -> Self {
        Self {
            archived: Some(ArchivedFilter::Active.flag()),
            ..Self::default()
        }
    }
}

/// Body of permission create and edit. Relation sets are full replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPayload {
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
    #[serde(default)]
    pub client_ids: Vec<i64>,
    #[serde(default)]
    pub menu_ids: Vec<i64>,
    #[serde(default)]
    pub permission_group_ids: Vec<i64>,
}

impl Validate for PermissionPayload {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name, MAX_NAME_LEN)?;
        optional_text("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)?;
        positive_opt("statusId", self.status_id)?;
        positive_all("roleIds", &self.role_ids)?;
        positive_all("clientIds", &self.client_ids)?;
        positive_all("menuIds", &self.menu_ids)?;
        positive_all("permissionGroupIds", &self.permission_group_ids)
    }
}
