use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named permission grantable to roles, clients and menus.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
    pub status_name: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// A permission with its linked role, client, menu and group ids.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDetail {
    #[serde(flatten)]
    pub permission: Permission,
    pub role_ids: Vec<i64>,
    pub client_ids: Vec<i64>,
    pub menu_ids: Vec<i64>,
    pub permission_group_ids: Vec<i64>,
}
