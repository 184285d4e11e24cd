use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A sellable bundle of service types and their work items.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
    /// Lineage only: the offering this one was seeded from.
    pub clone_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// One service type linked to an offering, with the work items chosen for it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeLink {
    pub service_type_id: i64,
    #[serde(default)]
    pub work_item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOfferingDetail {
    #[serde(flatten)]
    pub offering: ServiceOffering,
    pub service_type_data: Vec<ServiceTypeLink>,
}
