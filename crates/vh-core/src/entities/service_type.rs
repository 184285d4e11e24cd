use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
    pub clone_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// A service type with the offerings it belongs to and its own work items.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeDetail {
    #[serde(flatten)]
    pub service_type: ServiceType,
    pub service_offering_ids: Vec<i64>,
    pub work_item_ids: Vec<i64>,
}
