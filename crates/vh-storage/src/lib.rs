//! # vh-storage
//!
//! Object storage for questionnaire image answers.
//!
//! [`ImageStore`] wraps an `object_store::ObjectStore`: Amazon S3 (or any
//! S3-compatible endpoint) when the `storage` config section is complete, a
//! local directory under the data dir otherwise, and an in-memory store for
//! tests. Keys are `{base_path}/{purpose}-{uuid}` and public URLs are
//! `{public_url}/{key}`.

mod error;

pub use error::StorageError;

use std::path::Path as FsPath;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use vh_config::StorageConfig;
use vh_core::enums::QuestionPurpose;

/// Build an object key: `{base_path}/{purpose}-{uuid}`.
#[must_use]
pub fn image_key(base_path: &str, purpose: QuestionPurpose) -> String {
    let name = format!("{}-{}", purpose.key_prefix(), uuid::Uuid::new_v4());
    let base = base_path.trim_matches('/');
    if base.is_empty() {
        name
    } else {
        format!("{base}/{name}")
    }
}

/// Image upload/download over any `ObjectStore` backend.
#[derive(Debug, Clone)]
pub struct ImageStore {
    store: Arc<dyn ObjectStore>,
    public_url: String,
    base_path: String,
    /// Whether the backend accepts object attributes (content type).
    attributes: bool,
}

impl ImageStore {
    /// S3 when `config` is complete, otherwise a local directory at
    /// `{data_dir}/objects`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be built.
    pub fn from_config(config: &StorageConfig, data_dir: &FsPath) -> Result<Self, StorageError> {
        if config.is_configured() {
            Self::s3(config)
        } else {
            tracing::debug!(dir = %data_dir.display(), "storage not configured, using local object store");
            Self::local(&data_dir.join("objects"), config)
        }
    }

    /// Amazon S3 or an S3-compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotConfigured` if bucket or credentials are
    /// missing, or `StorageError::ObjectStore` if the client cannot be built.
    pub fn s3(config: &StorageConfig) -> Result<Self, StorageError> {
        if !config.is_configured() {
            return Err(StorageError::NotConfigured(
                "storage.bucket, storage.access_key_id and storage.secret_access_key are required"
                    .into(),
            ));
        }
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key);
        if !config.endpoint.is_empty() {
            builder = builder
                .with_endpoint(&config.endpoint)
                .with_allow_http(config.endpoint.starts_with("http://"))
                .with_virtual_hosted_style_request(false);
        }
        let store = builder.build()?;
        tracing::debug!(bucket = %config.bucket, "s3 object store ready");
        Ok(Self::with_store(
            Arc::new(store),
            config.public_base_url(),
            config.base_path.clone(),
            true,
        ))
    }

    /// Local directory store. Public URLs default to `file://{root}`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be created.
    pub fn local(root: &FsPath, config: &StorageConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let store = LocalFileSystem::new_with_prefix(root)?;
        let public_url = if config.public_url.is_empty() {
            format!("file://{}", root.display())
        } else {
            config.public_base_url()
        };
        // LocalFileSystem rejects object attributes.
        Ok(Self::with_store(
            Arc::new(store),
            public_url,
            config.base_path.clone(),
            false,
        ))
    }

    /// In-memory store for tests.
    #[must_use]
    pub fn in_memory(public_url: &str, base_path: &str) -> Self {
        Self::with_store(
            Arc::new(InMemory::new()),
            public_url.to_string(),
            base_path.to_string(),
            true,
        )
    }

    #[must_use]
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        public_url: String,
        base_path: String,
        attributes: bool,
    ) -> Self {
        Self {
            store,
            public_url: public_url.trim_end_matches('/').to_string(),
            base_path,
            attributes,
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// A fresh key for an answer image of `purpose`.
    #[must_use]
    pub fn new_key(&self, purpose: QuestionPurpose) -> String {
        image_key(&self.base_path, purpose)
    }

    /// Public URL of `key`.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_url)
    }

    /// The key a URL produced by [`Self::url_for`] points at.
    #[must_use]
    pub fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }

    /// Store `body` under `key` and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the PUT fails.
    pub async fn upload_image(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let path = Path::parse(key)?;
        let size = body.len();
        let mut options = PutOptions::default();
        if self.attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            options.attributes = attributes;
        }
        self.store
            .put_opts(&path, PutPayload::from(body), options)
            .await?;
        tracing::info!(key, size, content_type, "image uploaded");
        Ok(self.url_for(key))
    }

    /// Stream the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the object is missing.
    pub async fn get_image(
        &self,
        key: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, StorageError>>, StorageError> {
        let path = Path::parse(key)?;
        let result = self.store.get(&path).await?;
        Ok(result.into_stream().map_err(StorageError::from).boxed())
    }

    /// Delete `key`. Deleting a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the DELETE fails.
    pub async fn delete_image(&self, key: &str) -> Result<(), StorageError> {
        let path = Path::parse(key)?;
        match self.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => {
                tracing::info!(key, "image deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the HEAD fails for a
    /// reason other than absence.
    pub async fn does_image_exist(&self, key: &str) -> Result<bool, StorageError> {
        let path = Path::parse(key)?;
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
