//! # vh-config
//!
//! Layered configuration loading for VenueHub using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VENUEHUB_*` prefix, `__` as separator)
//! 2. Project-level `.venuehub/config.toml`
//! 3. User-level `~/.config/venuehub/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VENUEHUB_STORAGE__BUCKET` -> `storage.bucket`,
//! `VENUEHUB_DATABASE__PATH` -> `database.path`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use vh_config::VenueConfig;
//!
//! let config = VenueConfig::load_with_dotenv().expect("config");
//! if config.storage.is_configured() {
//!     println!("Bucket: {}", config.storage.bucket);
//! }
//! ```

mod database;
mod error;
mod general;
mod storage;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VenueConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl VenueConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with an explicit project config file on top of the
    /// user-global one (used by `vh --config`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_with_project(path).extract()?;
        config.check()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        Self::figment_with_project(&PathBuf::from(".venuehub/config.toml"))
    }

    fn figment_with_project(project_path: &std::path::Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        if project_path.exists() {
            figment = figment.merge(Toml::file(project_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("VENUEHUB_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("venuehub").join("config.toml"))
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be positive".into(),
            });
        }
        if self.general.max_limit < self.general.default_limit {
            return Err(ConfigError::InvalidValue {
                field: "general.max_limit".into(),
                reason: format!(
                    "must be at least general.default_limit ({})",
                    self.general.default_limit
                ),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Require the storage section, for commands that cannot fall back to
    /// the local object store.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if bucket or credentials are missing.
    pub fn require_storage(&self) -> Result<&StorageConfig, ConfigError> {
        if self.storage.is_configured() {
            Ok(&self.storage)
        } else {
            Err(ConfigError::NotConfigured {
                section: "storage".into(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = VenueConfig::default();
        assert!(!config.storage.is_configured());
        assert_eq!(config.database.path, ".venuehub/venuehub.db");
        assert_eq!(config.general.default_limit, 10);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: VenueConfig = VenueConfig::figment().extract()?;
            assert!(!config.storage.is_configured());
            assert_eq!(config.general.max_limit, 100);
            Ok(())
        });
    }

    #[test]
    fn require_storage_errors_when_unconfigured() {
        let config = VenueConfig::default();
        assert!(matches!(
            config.require_storage(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn check_rejects_zero_default_limit() {
        let mut config = VenueConfig::default();
        config.general.default_limit = 0;
        assert!(matches!(
            config.check(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
