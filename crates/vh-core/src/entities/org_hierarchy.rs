use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A client's organisational hierarchy definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientHierarchy {
    pub id: i64,
    pub client_id: i64,
    pub client_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
    pub effective_date: NaiveDate,
    pub clone_id: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLevel {
    pub id: i64,
    pub level_name: String,
    pub level_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientHierarchyDetail {
    #[serde(flatten)]
    pub hierarchy: ClientHierarchy,
    pub levels: Vec<HierarchyLevel>,
}
