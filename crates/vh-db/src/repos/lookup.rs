//! Lookup tables and referenced-id existence checks.

use vh_core::entities::{Client, Menu, PermissionGroup, Profile, Role, Status, WorkItem};

use crate::VenueDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_datetime, get_opt_string, read_count, read_ids};

/// Tables whose ids are referenced from request payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefTable {
    Statuses,
    Profiles,
    Roles,
    Clients,
    Menus,
    PermissionGroups,
    WorkItems,
    ServiceTypes,
    ServiceOfferings,
    Vendors,
    OrgHierarchies,
    Questions,
    QuestionOptions,
}

impl RefTable {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Statuses => "statuses",
            Self::Profiles => "profiles",
            Self::Roles => "roles",
            Self::Clients => "clients",
            Self::Menus => "menus",
            Self::PermissionGroups => "permission_groups",
            Self::WorkItems => "work_items",
            Self::ServiceTypes => "service_types",
            Self::ServiceOfferings => "service_offerings",
            Self::Vendors => "vendors",
            Self::OrgHierarchies => "client_hierarchies",
            Self::Questions => "questions",
            Self::QuestionOptions => "question_options",
        }
    }

    /// Human-readable entity name for error messages.
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
            Self::ServiceTypes => "Service type",
            Self::ServiceOfferings => "Service offering",
            Self::Vendors => "Vendor",
            Self::OrgHierarchies => "Org hierarchy",
            Self::Questions => "Question",
            Self::QuestionOptions => "Question option",
        }
    }
}

/// Lookup tables that carry only a name and can be added from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedLookup {
    Roles,
    Clients,
    Menus,
    PermissionGroups,
    WorkItems,
}

impl NamedLookup {
    const fn table(self) -> &'static str {
        match self {
            Self::Roles => RefTable::Roles.table(),
            Self::Clients => RefTable::Clients.table(),
            Self::Menus => RefTable::Menus.table(),
            Self::PermissionGroups => RefTable::PermissionGroups.table(),
            Self::WorkItems => RefTable::WorkItems.table(),
        }
    }
}

impl VenueDb {
    /// Ids from `ids` that have no row in `table`, in input order without
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn missing_ids(&self, table: RefTable, ids: &[i64]) -> Result<Vec<i64>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT id FROM {} WHERE id IN ({})",
            table.table(),
            placeholders.join(", ")
        );
        let found = read_ids(
            self.conn()
                .query(&sql, libsql::params_from_iter(ids.iter().copied()))
                .await?,
        )
        .await?;

        let mut missing = Vec::new();
        for id in ids {
            if !found.contains(id) && !missing.contains(id) {
                missing.push(*id);
            }
        }
        Ok(missing)
    }

    /// Whether a row with `id` exists in `table`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn record_exists(&self, table: RefTable, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table.table());
        Ok(read_count(self.conn().query(&sql, [id]).await?).await? > 0)
    }

    pub async fn list_statuses(&self) -> Result<Vec<Status>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, status_name FROM statuses ORDER BY id", ())
            .await?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next().await? {
            statuses.push(Status {
                id: row.get(0)?,
                status_name: row.get(1)?,
            });
        }
        Ok(statuses)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, first_name, last_name, email FROM profiles ORDER BY last_name, first_name, id",
                (),
            )
            .await?;
        let mut profiles = Vec::new();
        while let Some(row) = rows.next().await? {
            profiles.push(Profile {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                email: get_opt_string(&row, 3)?,
            });
        }
        Ok(profiles)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name, archived_at FROM roles ORDER BY name, id", ())
            .await?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next().await? {
            roles.push(Role {
                id: row.get(0)?,
                name: row.get(1)?,
                archived_at: get_opt_datetime(&row, 2)?,
            });
        }
        Ok(roles)
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name, archived_at FROM clients ORDER BY name, id", ())
            .await?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next().await? {
            clients.push(Client {
                id: row.get(0)?,
                name: row.get(1)?,
                archived_at: get_opt_datetime(&row, 2)?,
            });
        }
        Ok(clients)
    }

    pub async fn list_menus(&self) -> Result<Vec<Menu>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name, path FROM menus ORDER BY name, id", ())
            .await?;
        let mut menus = Vec::new();
        while let Some(row) = rows.next().await? {
            menus.push(Menu {
                id: row.get(0)?,
                name: row.get(1)?,
                path: get_opt_string(&row, 2)?,
            });
        }
        Ok(menus)
    }

    pub async fn list_permission_groups(&self) -> Result<Vec<PermissionGroup>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name FROM permission_groups ORDER BY name, id", ())
            .await?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next().await? {
            groups.push(PermissionGroup {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(groups)
    }

    pub async fn list_work_items(&self) -> Result<Vec<WorkItem>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, name, archived_at FROM work_items ORDER BY name, id",
                (),
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(WorkItem {
                id: row.get(0)?,
                name: row.get(1)?,
                archived_at: get_opt_datetime(&row, 2)?,
            });
        }
        Ok(items)
    }

    /// Insert a named lookup row and return its id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_lookup(&self, kind: NamedLookup, name: &str) -> Result<i64, DatabaseError> {
        let sql = format!("INSERT INTO {} (name) VALUES (?1)", kind.table());
        self.conn().execute(&sql, [name.trim()]).await?;
        let id = self.conn().last_insert_rowid();
        tracing::info!(table = kind.table(), id, "lookup created");
        Ok(id)
    }

    /// Insert a profile and return its id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_profile(
        &self,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO profiles (first_name, last_name, email) VALUES (?1, ?2, ?3)",
                libsql::params![first_name.trim(), last_name.trim(), email],
            )
            .await?;
        let id = self.conn().last_insert_rowid();
        tracing::info!(id, "profile created");
        Ok(id)
    }
}
