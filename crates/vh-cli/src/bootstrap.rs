use std::path::Path;

use anyhow::Context;
use vh_config::VenueConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered config. `--config` replaces the project
/// config file.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<VenueConfig> {
    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            return Err(error).context("failed to load .env file");
        }
    }

    match &flags.config {
        Some(path) => VenueConfig::load_from(Path::new(path))
            .with_context(|| format!("failed to load config from {path}")),
        None => VenueConfig::load().context("failed to load configuration"),
    }
}
