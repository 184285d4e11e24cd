use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{AnswerInput, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, Validate, optional_text, positive, require_text};
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueChecklistFilter {
    pub vendor_id: Option<i64>,
    pub name: Option<String>,
    pub archived: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueChecklistPayload {
    pub vendor_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

impl Validate for VenueChecklistPayload {
    fn validate(&self) -> Result<(), CoreError> {
        positive("vendorId", self.vendor_id)?;
        require_text("name", &self.name, MAX_NAME_LEN)?;
        optional_text("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)?;
        self.answers.iter().try_for_each(Validate::validate)
    }
}
