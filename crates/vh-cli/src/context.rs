use std::path::Path;

use anyhow::Context;
use vh_api::Api;
use vh_config::VenueConfig;
use vh_db::VenueDb;
use vh_storage::ImageStore;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub api: Api,
    pub config: VenueConfig,
}

impl AppContext {
    /// Open the database (running migrations), pick the image backend and
    /// wire the controllers.
    pub async fn init(config: VenueConfig) -> anyhow::Result<Self> {
        let db = open_database(&config).await?;

        let data_dir = Path::new(&config.general.data_dir);
        let images = ImageStore::from_config(&config.storage, data_dir)
            .context("failed to initialize image storage")?;
        if !config.storage.is_configured() {
            tracing::info!(
                path = %data_dir.join("objects").display(),
                "storage not configured; answer images are kept locally"
            );
        }

        let api = Api::new(db, images, &config);
        Ok(Self { api, config })
    }
}

pub async fn open_database(config: &VenueConfig) -> anyhow::Result<VenueDb> {
    let path = &config.database.path;
    if !config.database.is_in_memory() {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    VenueDb::open_local(path)
        .await
        .with_context(|| format!("failed to open database at {path}"))
}
