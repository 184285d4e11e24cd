//! Reference data the domain forms pick from.

use std::sync::Arc;

use serde_json::Value;
use vh_db::VenueDb;
use vh_db::repos::lookup::NamedLookup;

use crate::error::ApiError;

/// Every lookup table that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Statuses,
    Profiles,
    Roles,
    Clients,
    Menus,
    PermissionGroups,
    WorkItems,
}

impl LookupKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Statuses => "Status",
            Self::Profiles => "Profile",
            Self::Roles => "Role",
            Self::Clients => "Client",
            Self::Menus => "Menu",
            Self::PermissionGroups => "Permission group",
            Self::WorkItems => "Work item",
        }
    }

    /// The name-only table behind this kind, if rows can be added by name.
    #[must_use]
    pub const fn named(self) -> Option<NamedLookup> {
        match self {
            Self::Roles => Some(NamedLookup::Roles),
            Self::Clients => Some(NamedLookup::Clients),
            Self::Menus => Some(NamedLookup::Menus),
            Self::PermissionGroups => Some(NamedLookup::PermissionGroups),
            Self::WorkItems => Some(NamedLookup::WorkItems),
            Self::Statuses | Self::Profiles => None,
        }
    }
}

#[derive(Clone)]
pub struct LookupService {
    db: Arc<VenueDb>,
}

impl LookupService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>) -> Self {
        Self { db }
    }

    /// All rows of one lookup table as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(&self, kind: LookupKind) -> Result<Value, ApiError> {
        let db = &self.db;
        let value = match kind {
            LookupKind::Statuses => to_value(db.list_statuses().await?),
            LookupKind::Profiles => to_value(db.list_profiles().await?),
            LookupKind::Roles => to_value(db.list_roles().await?),
            LookupKind::Clients => to_value(db.list_clients().await?),
            LookupKind::Menus => to_value(db.list_menus().await?),
            LookupKind::PermissionGroups => to_value(db.list_permission_groups().await?),
            LookupKind::WorkItems => to_value(db.list_work_items().await?),
        };
        Ok(value)
    }

    /// # Errors
    ///
    /// Returns `BadRequest` if `kind` cannot be added by name or `name` is
    /// blank.
    pub async fn add(&self, kind: LookupKind, name: &str) -> Result<i64, ApiError> {
        let Some(named) = kind.named() else {
            return Err(ApiError::BadRequest(format!(
                "{} rows cannot be added by name",
                kind.label()
            )));
        };
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("name is required".into()));
        }
        Ok(self.db.create_lookup(named, name).await?)
    }

    /// # Errors
    ///
    /// Returns `BadRequest` if either name is blank.
    pub async fn add_profile(
        &self,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> Result<i64, ApiError> {
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "firstName and lastName are required".into(),
            ));
        }
        Ok(self.db.create_profile(first_name, last_name, email).await?)
    }
}

fn to_value<T: serde::Serialize>(rows: Vec<T>) -> Value {
    Value::Array(
        rows.into_iter()
            .filter_map(|row| serde_json::to_value(row).ok())
            .collect(),
    )
}
