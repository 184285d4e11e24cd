use figment::Jail;
use vh_config::{ConfigError, VenueConfig};

#[test]
fn env_vars_fill_config_values() {
    Jail::expect_with(|jail| {
        jail.set_env("VENUEHUB_DATABASE__PATH", ":memory:");
        jail.set_env("VENUEHUB_STORAGE__ACCESS_KEY_ID", "env-key");

        let config = VenueConfig::load().expect("config loads");
        assert!(config.database.is_in_memory());
        assert_eq!(config.storage.access_key_id, "env-key");
        Ok(())
    });
}

#[test]
fn invalid_limits_are_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("VENUEHUB_GENERAL__DEFAULT_LIMIT", "50");
        jail.set_env("VENUEHUB_GENERAL__MAX_LIMIT", "20");

        let err = VenueConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
