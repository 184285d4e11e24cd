use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MAX_NAME_LEN, Validate, optional_text, positive_all, positive_opt, require_text};
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorFilter {
    pub name: Option<String>,
    #[serde(default)]
    pub status_ids: Vec<i64>,
    #[serde(default)]
    pub client_ids: Vec<i64>,
    pub archived: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPayload {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status_id: Option<i64>,
    #[serde(default)]
    pub addresses: Vec<AddressInput>,
    #[serde(default)]
    pub client_ids: Vec<i64>,
}

impl Validate for VendorPayload {
    fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name, MAX_NAME_LEN)?;
        optional_text("email", self.email.as_deref(), MAX_NAME_LEN)?;
        optional_text("phone", self.phone.as_deref(), 32)?;
        positive_opt("statusId", self.status_id)?;
        positive_all("clientIds", &self.client_ids)?;
        for address in &self.addresses {
            require_text("addressLine1", &address.address_line1, MAX_NAME_LEN)?;
        }
        Ok(())
    }
}
