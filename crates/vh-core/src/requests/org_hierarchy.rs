use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN, Validate, optional_text, positive, positive_opt, require_text};
use crate::enums::CreateType;
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgHierarchyFilter {
    pub name: Option<String>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
    #[serde(default)]
    pub client_ids: Vec<i64>,
    pub archived: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelInput {
    pub level_name: String,
    pub level_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgHierarchyPayload {
    pub client_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    pub effective_date: NaiveDate,
    #[serde(rename = "type", default)]
    pub create_type: CreateType,
    pub clone_id: Option<i64>,
    #[serde(default)]
    pub levels: Vec<LevelInput>,
}

impl Validate for OrgHierarchyPayload {
    fn validate(&self) -> Result<(), CoreError> {
        positive("clientId", self.client_id)?;
        require_text("name", &self.name, MAX_NAME_LEN)?;
        optional_text("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)?;
        positive_opt("statusId", self.status_id)?;
        positive_opt("cloneId", self.clone_id)?;
        for level in &self.levels {
            require_text("levelName", &level.level_name, MAX_NAME_LEN)?;
            positive("levelOrder", level.level_order)?;
        }
        Ok(())
    }
}
