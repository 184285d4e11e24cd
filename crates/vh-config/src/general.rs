//! General settings.

use serde::{Deserialize, Serialize};

const fn default_limit() -> u64 {
    10
}

const fn default_max_limit() -> u64 {
    100
}

fn default_data_dir() -> String {
    String::from(".venuehub")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size used when a list request omits `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Upper bound applied to every list request's `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,

    /// Directory for local state (object fallback store lives under it).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            data_dir: default_data_dir(),
        }
    }
}
