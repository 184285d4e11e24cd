//! S3-compatible object storage for questionnaire image uploads.

use serde::{Deserialize, Serialize};

fn default_region() -> String {
    String::from("us-east-1")
}

fn default_base_path() -> String {
    String::from("uploads")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL (MinIO, R2). Empty means AWS.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Key prefix every uploaded object is placed under.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Public base URL that object keys are appended to. If empty, built
    /// from the endpoint and bucket.
    #[serde(default)]
    pub public_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            base_path: default_base_path(),
            public_url: String::new(),
        }
    }
}

impl StorageConfig {
    /// Check if the storage config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.bucket.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
    }

    /// Base URL uploaded keys are appended to, without a trailing slash.
    pub fn public_base_url(&self) -> String {
        let url = if !self.public_url.is_empty() {
            self.public_url.clone()
        } else if !self.endpoint.is_empty() {
            format!("{}/{}", self.endpoint.trim_end_matches('/'), self.bucket)
        } else {
            format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region)
        };
        url.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = StorageConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.base_path, "uploads");
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn configured_when_all_required_fields_set() {
        let config = StorageConfig {
            bucket: "venues".into(),
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn not_configured_when_missing_field() {
        let config = StorageConfig {
            bucket: "venues".into(),
            access_key_id: String::new(), // missing
            secret_access_key: "secret".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn public_url_built_from_bucket_and_region() {
        let config = StorageConfig {
            bucket: "venues".into(),
            region: "eu-west-1".into(),
            ..Default::default()
        };
        assert_eq!(
            config.public_base_url(),
            "https://venues.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn public_url_built_from_custom_endpoint() {
        let config = StorageConfig {
            bucket: "venues".into(),
            endpoint: "http://localhost:9000/".into(),
            ..Default::default()
        };
        assert_eq!(config.public_base_url(), "http://localhost:9000/venues");
    }

    #[test]
    fn explicit_public_url_wins() {
        let config = StorageConfig {
            bucket: "venues".into(),
            endpoint: "http://localhost:9000".into(),
            public_url: "https://cdn.example.com/".into(),
            ..Default::default()
        };
        assert_eq!(config.public_base_url(), "https://cdn.example.com");
    }
}
