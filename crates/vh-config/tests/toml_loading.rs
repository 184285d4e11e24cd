//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use vh_config::VenueConfig;

#[test]
fn loads_storage_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[storage]
bucket = "venue-assets"
region = "eu-central-1"
access_key_id = "toml-key"
secret_access_key = "toml-secret"
base_path = "checklists"
public_url = "https://cdn.example.com"
"#,
        )?;

        let config: VenueConfig = Figment::from(Serialized::defaults(VenueConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.storage.bucket, "venue-assets");
        assert_eq!(config.storage.region, "eu-central-1");
        assert_eq!(config.storage.base_path, "checklists");
        assert_eq!(config.storage.public_base_url(), "https://cdn.example.com");
        assert!(config.storage.is_configured());
        Ok(())
    });
}

#[test]
fn loads_database_and_general_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/venuehub/main.db"

[general]
default_limit = 25
max_limit = 200
"#,
        )?;

        let config: VenueConfig = Figment::from(Serialized::defaults(VenueConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/venuehub/main.db");
        assert_eq!(config.general.default_limit, 25);
        assert_eq!(config.general.max_limit, 200);
        Ok(())
    });
}

#[test]
fn project_file_loaded_through_load_from() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "venue.toml",
            r#"
[database]
path = ":memory:"
"#,
        )?;

        let config = VenueConfig::load_from(std::path::Path::new("venue.toml"))
            .expect("config loads");
        assert!(config.database.is_in_memory());
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[storage]
bucket = "from-toml"
"#,
        )?;
        jail.set_env("VENUEHUB_STORAGE__BUCKET", "from-env");

        let config: VenueConfig = Figment::from(Serialized::defaults(VenueConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("VENUEHUB_").split("__"))
            .extract()?;

        assert_eq!(config.storage.bucket, "from-env");
        Ok(())
    });
}
