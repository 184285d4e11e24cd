use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN, Validate, optional_text, positive_all, positive_opt, require_text};
use crate::enums::CreateType;
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeFilter {
    pub name: Option<String>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
    #[serde(default)]
    pub work_item_ids: Vec<i64>,
    pub archived: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypePayload {
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub create_type: CreateType,
    pub clone_id: Option<i64>,
    #[serde(default)]
    pub service_offering_ids: Vec<i64>,
    #[serde(default)]
    pub work_item_ids: Vec<i64>,
}

impl Validate for ServiceTypePayload {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name, MAX_NAME_LEN)?;
        optional_text("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)?;
        positive_opt("statusId", self.status_id)?;
        positive_opt("cloneId", self.clone_id)?;
        positive_all("serviceOfferingIds", &self.service_offering_ids)?;
        positive_all("workItemIds", &self.work_item_ids)
    }
}
